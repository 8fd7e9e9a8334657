//! Parallel equation assembly with ordered merges.
//!
//! Row `u` of the system reads
//!
//! ```text
//! (Σ_o w_o)·x_u − Σ_{o: u+o unknown} w_o·x_{u+o} = seed_u + Σ_{o: u+o fixed} w_o·T_{u+o}
//! ```
//!
//! over the in-bounds stencil offsets `o`, with `w_o = 1/‖o‖`, divided by
//! `1 + |c(u) − c(u+o)|` when a conductivity field is present. `seed_u`
//! is the value the input grid holds at the unknown cell.
//!
//! One pool task per offset computes its [`OffsetContribution`]
//! independently, then merges it into the shared [`Accumulator`] through
//! the gate chain, so merges (and thus every floating-point sum) happen
//! in stencil order regardless of scheduling. Diagonal triples are
//! appended after the last merge.

use std::sync::Arc;

use heatfill_core::{Coord, LinalgError, SpaceError};
use heatfill_space::{Stencil, UnknownIndexMap};
use heatfill_sparse::SparseSystem;
use ndarray::{ArrayViewD, IxDyn};

use crate::error::SolveError;
use crate::gate;
use crate::pool::WorkerPool;

/// Read-only inputs shared by every assembly task.
#[derive(Debug)]
pub struct AssemblyContext {
    map: UnknownIndexMap,
    grid: Vec<f64>,
    conductivity: Option<Vec<f64>>,
}

impl AssemblyContext {
    /// Flatten `grid` (and `conductivity`, broadcast to the grid shape)
    /// in row-major order alongside the index map.
    pub fn new(
        map: UnknownIndexMap,
        grid: ArrayViewD<'_, f64>,
        conductivity: Option<ArrayViewD<'_, f64>>,
    ) -> Result<Self, SpaceError> {
        if grid.shape() != map.shape() {
            return Err(SpaceError::ShapeMismatch {
                expected: map.shape().to_vec(),
                actual: grid.shape().to_vec(),
            });
        }
        let conductivity = match conductivity {
            None => None,
            Some(c) => {
                let view = c.broadcast(IxDyn(map.shape())).ok_or_else(|| {
                    SpaceError::NotBroadcastable {
                        from: c.shape().to_vec(),
                        to: map.shape().to_vec(),
                    }
                })?;
                Some(view.iter().copied().collect())
            }
        };
        Ok(Self {
            grid: grid.iter().copied().collect(),
            map,
            conductivity,
        })
    }

    /// The unknown index map.
    pub fn map(&self) -> &UnknownIndexMap {
        &self.map
    }

    /// Input values at the unknown cells, in unknown order.
    pub fn seeds(&self) -> Vec<f64> {
        self.map
            .unknown_to_domain()
            .iter()
            .map(|&flat| self.grid[flat])
            .collect()
    }

    fn weight(&self, from: usize, to: usize, base: f64) -> f64 {
        match &self.conductivity {
            None => base,
            Some(c) => base / (1.0 + (c[from] - c[to]).abs()),
        }
    }
}

/// Everything one stencil offset adds to the system.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OffsetContribution {
    /// Off-diagonal rows (unknown → unknown neighbour).
    pub rows: Vec<u32>,
    /// Off-diagonal columns.
    pub cols: Vec<u32>,
    /// Off-diagonal values, `−w`.
    pub values: Vec<f64>,
    /// Rows whose neighbour is fixed.
    pub rhs_rows: Vec<u32>,
    /// `w · T_neighbour` for each fixed neighbour.
    pub rhs_values: Vec<f64>,
    /// Rows with an in-bounds neighbour.
    pub diag_rows: Vec<u32>,
    /// `w` for each in-bounds neighbour.
    pub diag_values: Vec<f64>,
}

/// Compute the contribution of `offset` (Euclidean length `norm`).
pub fn offset_contribution(ctx: &AssemblyContext, offset: &[i32], norm: f64) -> OffsetContribution {
    let map = &ctx.map;
    let base = 1.0 / norm;
    let mut out = OffsetContribution::default();
    for u in 0..map.unknown_count() {
        let Some(neighbour) = map.neighbour_flat(u, offset) else {
            continue;
        };
        let from = map.unknown_to_flat(u);
        let w = ctx.weight(from, neighbour, base);
        let row = u as u32;
        out.diag_rows.push(row);
        out.diag_values.push(w);
        match map.index_of(neighbour) {
            Some(col) => {
                out.rows.push(row);
                out.cols.push(col);
                out.values.push(-w);
            }
            None => {
                out.rhs_rows.push(row);
                out.rhs_values.push(w * ctx.grid[neighbour]);
            }
        }
    }
    out
}

/// The system under construction, owned by whichever gate holds it.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulator {
    rhs: Vec<f64>,
    diagonal: Vec<f64>,
    rows: Vec<u32>,
    cols: Vec<u32>,
    values: Vec<f64>,
}

impl Accumulator {
    /// Start from the source term `seeds` with an empty matrix.
    pub fn new(seeds: Vec<f64>) -> Self {
        let k = seeds.len();
        Self {
            rhs: seeds,
            diagonal: vec![0.0; k],
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Fold one offset's contribution in.
    pub fn merge(&mut self, c: OffsetContribution) {
        for (&r, &v) in c.rhs_rows.iter().zip(&c.rhs_values) {
            self.rhs[r as usize] += v;
        }
        self.rows.extend_from_slice(&c.rows);
        self.cols.extend_from_slice(&c.cols);
        self.values.extend_from_slice(&c.values);
        for (&r, &w) in c.diag_rows.iter().zip(&c.diag_values) {
            self.diagonal[r as usize] += w;
        }
    }

    /// Append one diagonal triple per row and seal the system.
    pub fn into_system(mut self) -> Result<SparseSystem, LinalgError> {
        let k = self.rhs.len();
        self.rows.reserve(k);
        self.cols.reserve(k);
        self.values.reserve(k);
        for (u, &d) in self.diagonal.iter().enumerate() {
            self.rows.push(u as u32);
            self.cols.push(u as u32);
            self.values.push(d);
        }
        SparseSystem::new(k, self.rows, self.cols, self.values, self.rhs)
    }
}

/// Assemble the system on `pool`, merging offsets in stencil order.
pub fn assemble(
    ctx: &Arc<AssemblyContext>,
    stencil: &Stencil,
    pool: &WorkerPool,
) -> Result<SparseSystem, SolveError> {
    let (gates, tail) = gate::chain(Accumulator::new(ctx.seeds()), stencil.len());

    let mut handles = Vec::with_capacity(gates.len());
    for gate in gates {
        let i = gate.index();
        let offset = Coord::from_slice(stencil.offset(i));
        let norm = stencil.norm(i);
        let ctx = Arc::clone(ctx);
        handles.push(pool.submit(move || {
            let contribution = offset_contribution(&ctx, &offset, norm);
            gate.pass(|acc| acc.merge(contribution))
        })?);
    }
    for handle in handles {
        handle.wait()??;
    }

    let acc = tail.finish()?;
    Ok(acc.into_system()?)
}
