//! Benchmark problems for the heatfill diffusion solver.
//!
//! - [`reference_problem`]: 100x100 grid (10K cells), ~20% fixed
//! - [`stress_problem`]: 316x316 grid (~100K cells), same density
//! - [`volume_problem`]: 24x24x24 grid for higher-dimensional stencils
//! - [`scattered_problem`]: deterministic fixed-cell placement via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use heatfill_engine::SolveConfig;
use ndarray::{ArrayD, Dimension, IxDyn};

/// A grid with its fixed mask.
#[derive(Clone, Debug)]
pub struct BenchProblem {
    /// Cell values; fixed cells carry boundary data, unknown cells zero.
    pub grid: ArrayD<f64>,
    /// `true` at boundary cells.
    pub fixed: ArrayD<bool>,
}

impl BenchProblem {
    /// Number of unknown cells.
    pub fn unknowns(&self) -> usize {
        self.fixed.iter().filter(|&&f| !f).count()
    }
}

/// 100x100 grid with a fixed border and roughly one fixed cell in five.
pub fn reference_problem(seed: u64) -> BenchProblem {
    scattered_problem(&[100, 100], 5, seed)
}

/// 316x316 grid, same layout as [`reference_problem`].
pub fn stress_problem(seed: u64) -> BenchProblem {
    scattered_problem(&[316, 316], 5, seed)
}

/// 24x24x24 grid, same layout as [`reference_problem`].
pub fn volume_problem(seed: u64) -> BenchProblem {
    scattered_problem(&[24, 24, 24], 5, seed)
}

/// Fix every border cell plus about one cell in `one_in`, chosen by a
/// multiplicative hash of the flat index and `seed`. Fixed cells get
/// values in `[0, 1)`.
pub fn scattered_problem(shape: &[usize], one_in: u64, seed: u64) -> BenchProblem {
    let one_in = one_in.max(1);
    let hash = |flat: usize| {
        (flat as u64)
            .wrapping_add(seed)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407)
            >> 33
    };
    let fixed = ArrayD::from_shape_fn(IxDyn(shape), |ix| {
        let border = ix.slice().iter().zip(shape).any(|(&i, &n)| i == 0 || i + 1 == n);
        border || hash(flat_index(ix.slice(), shape)) % one_in == 0
    });
    let grid = ArrayD::from_shape_fn(IxDyn(shape), |ix| {
        if fixed[&ix] {
            (hash(flat_index(ix.slice(), shape)) % 1000) as f64 / 1000.0
        } else {
            0.0
        }
    });
    BenchProblem { grid, fixed }
}

/// Solver settings used by the benchmarks.
pub fn bench_config(neighbor_distance: u32, workers: usize) -> SolveConfig {
    SolveConfig {
        neighbor_distance,
        worker_count: Some(workers),
        ..SolveConfig::default()
    }
}

fn flat_index(ix: &[usize], shape: &[usize]) -> usize {
    ix.iter().zip(shape).fold(0, |acc, (&i, &n)| acc * n + i)
}
