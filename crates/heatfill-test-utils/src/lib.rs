//! Test utilities and mock types for heatfill development.
//!
//! Provides a [`RecordingObserver`] that keeps every [`SolveEvent`], a
//! [`CountingBackend`] that wraps [`CpuBackend`] and counts calls, a
//! [`RejectingBackend`] whose direct solve always fails, a
//! [`NegatingBackend`] whose products make conjugate gradient break down,
//! and the grid fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use heatfill_core::{LinalgError, SolveEvent, SolveObserver};
use heatfill_sparse::{Backend, CpuBackend, SparseSystem};
use sprs::CsMatView;

/// Observer that records every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SolveEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event received so far, in arrival order.
    pub fn events(&self) -> Vec<SolveEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&SolveEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl SolveObserver for RecordingObserver {
    fn on_event(&self, event: &SolveEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// [`CpuBackend`] with counters on [`Backend::direct_solve`] and
/// [`Backend::spmv`].
#[derive(Debug, Default)]
pub struct CountingBackend {
    direct_solves: AtomicUsize,
    products: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct_solves(&self) -> usize {
        self.direct_solves.load(Ordering::SeqCst)
    }

    /// Sparse products computed, one per row block per matvec.
    pub fn products(&self) -> usize {
        self.products.load(Ordering::SeqCst)
    }
}

impl Backend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting-cpu"
    }

    fn full(&self, len: usize, value: f64) -> Vec<f64> {
        CpuBackend.full(len, value)
    }

    fn axpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        CpuBackend.axpy(alpha, x, y)
    }

    fn xpay(&self, x: &[f64], beta: f64, y: &mut [f64]) {
        CpuBackend.xpay(x, beta, y)
    }

    fn mul_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        CpuBackend.mul_elementwise(x, y, out)
    }

    fn div_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        CpuBackend.div_elementwise(x, y, out)
    }

    fn dot(&self, x: &[f64], y: &[f64]) -> f64 {
        CpuBackend.dot(x, y)
    }

    fn concat(&self, parts: Vec<Vec<f64>>) -> Vec<f64> {
        CpuBackend.concat(parts)
    }

    fn spmv(&self, m: CsMatView<'_, f64>, x: &[f64]) -> Vec<f64> {
        self.products.fetch_add(1, Ordering::SeqCst);
        CpuBackend.spmv(m, x)
    }

    fn direct_solve(&self, system: &SparseSystem) -> Result<Vec<f64>, LinalgError> {
        self.direct_solves.fetch_add(1, Ordering::SeqCst);
        CpuBackend.direct_solve(system)
    }
}

/// Backend whose direct solve always reports a singular matrix.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectingBackend;

impl Backend for RejectingBackend {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    fn full(&self, len: usize, value: f64) -> Vec<f64> {
        CpuBackend.full(len, value)
    }

    fn axpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        CpuBackend.axpy(alpha, x, y)
    }

    fn xpay(&self, x: &[f64], beta: f64, y: &mut [f64]) {
        CpuBackend.xpay(x, beta, y)
    }

    fn mul_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        CpuBackend.mul_elementwise(x, y, out)
    }

    fn div_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        CpuBackend.div_elementwise(x, y, out)
    }

    fn dot(&self, x: &[f64], y: &[f64]) -> f64 {
        CpuBackend.dot(x, y)
    }

    fn concat(&self, parts: Vec<Vec<f64>>) -> Vec<f64> {
        CpuBackend.concat(parts)
    }

    fn direct_solve(&self, _system: &SparseSystem) -> Result<Vec<f64>, LinalgError> {
        Err(LinalgError::SingularMatrix { index: 0 })
    }
}

/// Backend whose sparse products are negated, so every conjugate
/// gradient step sees `pᵀAp < 0` and breaks down. Direct solves are
/// untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NegatingBackend;

impl Backend for NegatingBackend {
    fn name(&self) -> &'static str {
        "negating"
    }

    fn full(&self, len: usize, value: f64) -> Vec<f64> {
        CpuBackend.full(len, value)
    }

    fn axpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        CpuBackend.axpy(alpha, x, y)
    }

    fn xpay(&self, x: &[f64], beta: f64, y: &mut [f64]) {
        CpuBackend.xpay(x, beta, y)
    }

    fn mul_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        CpuBackend.mul_elementwise(x, y, out)
    }

    fn div_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        CpuBackend.div_elementwise(x, y, out)
    }

    fn dot(&self, x: &[f64], y: &[f64]) -> f64 {
        CpuBackend.dot(x, y)
    }

    fn concat(&self, parts: Vec<Vec<f64>>) -> Vec<f64> {
        CpuBackend.concat(parts)
    }

    fn spmv(&self, m: CsMatView<'_, f64>, x: &[f64]) -> Vec<f64> {
        CpuBackend.spmv(m, x).into_iter().map(|v| -v).collect()
    }

    fn direct_solve(&self, system: &SparseSystem) -> Result<Vec<f64>, LinalgError> {
        CpuBackend.direct_solve(system)
    }
}
