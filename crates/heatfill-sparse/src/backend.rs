//! Pluggable vector arithmetic and direct sparse solves.
//!
//! The iterative solver and the engine only ever talk to a
//! `&dyn Backend`; they never branch on which implementation is behind
//! it. [`CpuBackend`] is the in-process implementation: plain sequential
//! loops for vector operations (so reductions are reproducible) and an
//! `sprs-ldl` LDLᵀ factorization for the direct solve.

use heatfill_core::LinalgError;
use sprs::{CsMatView, FillInReduction, SymmetryCheck};
use sprs_ldl::Ldl;

use crate::system::{spmv, SparseSystem};

/// Array and linear-algebra capability used by the solve pipeline.
///
/// Element-wise methods panic when slice lengths differ; callers size
/// their buffers from the operator dimension.
pub trait Backend: Send + Sync {
    /// Short identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// A vector of `len` zeros.
    fn zeros(&self, len: usize) -> Vec<f64> {
        self.full(len, 0.0)
    }

    /// A vector of `len` copies of `value`.
    fn full(&self, len: usize, value: f64) -> Vec<f64>;

    /// `y ← y + alpha·x`.
    fn axpy(&self, alpha: f64, x: &[f64], y: &mut [f64]);

    /// `y ← x + beta·y`.
    fn xpay(&self, x: &[f64], beta: f64, y: &mut [f64]);

    /// `out ← x ⊙ y`.
    fn mul_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]);

    /// `out ← x ⊘ y`.
    fn div_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]);

    /// Inner product `x·y`.
    fn dot(&self, x: &[f64], y: &[f64]) -> f64;

    /// Euclidean norm `‖x‖`.
    fn norm(&self, x: &[f64]) -> f64 {
        self.dot(x, x).sqrt()
    }

    /// Concatenate `parts` in order.
    fn concat(&self, parts: Vec<Vec<f64>>) -> Vec<f64>;

    /// Sparse product `m · x`. Row-partitioned matrices call this once per
    /// block, so CSR rows must be accumulated in stored order.
    fn spmv(&self, m: CsMatView<'_, f64>, x: &[f64]) -> Vec<f64> {
        spmv(m, x)
    }

    /// Solve the system directly.
    ///
    /// Fails with [`LinalgError::SingularMatrix`] on a zero or negative
    /// pivot and [`LinalgError::NonFinite`] if the result contains NaN or
    /// infinity. Residual acceptance is left to the caller.
    fn direct_solve(&self, system: &SparseSystem) -> Result<Vec<f64>, LinalgError>;
}

/// Sequential in-process backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackend;

impl CpuBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn full(&self, len: usize, value: f64) -> Vec<f64> {
        vec![value; len]
    }

    fn axpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), y.len(), "axpy: length mismatch");
        for (yi, &xi) in y.iter_mut().zip(x) {
            *yi += alpha * xi;
        }
    }

    fn xpay(&self, x: &[f64], beta: f64, y: &mut [f64]) {
        assert_eq!(x.len(), y.len(), "xpay: length mismatch");
        for (yi, &xi) in y.iter_mut().zip(x) {
            *yi = xi + beta * *yi;
        }
    }

    fn mul_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        assert!(x.len() == y.len() && y.len() == out.len(), "mul_elementwise: length mismatch");
        for ((o, &a), &b) in out.iter_mut().zip(x).zip(y) {
            *o = a * b;
        }
    }

    fn div_elementwise(&self, x: &[f64], y: &[f64], out: &mut [f64]) {
        assert!(x.len() == y.len() && y.len() == out.len(), "div_elementwise: length mismatch");
        for ((o, &a), &b) in out.iter_mut().zip(x).zip(y) {
            *o = a / b;
        }
    }

    fn dot(&self, x: &[f64], y: &[f64]) -> f64 {
        assert_eq!(x.len(), y.len(), "dot: length mismatch");
        let mut acc = 0.0;
        for (&a, &b) in x.iter().zip(y) {
            acc += a * b;
        }
        acc
    }

    fn concat(&self, parts: Vec<Vec<f64>>) -> Vec<f64> {
        let len = parts.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(len);
        for part in parts {
            out.extend_from_slice(&part);
        }
        out
    }

    fn direct_solve(&self, system: &SparseSystem) -> Result<Vec<f64>, LinalgError> {
        match system.size() {
            0 => return Ok(Vec::new()),
            // sprs-ldl cannot factorize a 1×1 matrix.
            1 => return solve_scalar(system),
            _ => {}
        }
        let csc = system.to_csc();
        let ldl = Ldl::new()
            .fill_in_reduction(FillInReduction::ReverseCuthillMcKee)
            .check_symmetry(SymmetryCheck::DontCheckSymmetry)
            .numeric(csc.view())
            .map_err(|e| match e {
                sprs::errors::LinalgError::SingularMatrix(info) => {
                    LinalgError::SingularMatrix { index: info.index }
                }
                other => LinalgError::OperatorFailed {
                    reason: other.to_string(),
                },
            })?;
        if let Some(index) = ldl.d().iter().position(|&d| d <= 0.0 || !d.is_finite()) {
            return Err(LinalgError::SingularMatrix { index });
        }
        let x = ldl.solve(system.rhs());
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(LinalgError::NonFinite { index });
        }
        Ok(x)
    }
}

fn solve_scalar(system: &SparseSystem) -> Result<Vec<f64>, LinalgError> {
    let a = system.diagonal()[0];
    if a <= 0.0 || !a.is_finite() {
        return Err(LinalgError::SingularMatrix { index: 0 });
    }
    let x = system.rhs()[0] / a;
    if !x.is_finite() {
        return Err(LinalgError::NonFinite { index: 0 });
    }
    Ok(vec![x])
}
