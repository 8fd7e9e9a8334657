//! Diffusion solve pipeline for heatfill.
//!
//! Turns a grid, a fixed mask and an optional conductivity field into a
//! filled grid: parallel equation assembly with ordered merges, a
//! row-partitioned sparse matrix for pool-parallel products, conjugate
//! gradient with a direct fallback, and a scatter back into the grid.
//! [`DiffusionSolver`] drives the whole thing; [`solve_diffusion`] is the
//! one-call form.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assemble;
pub mod config;
pub mod diffusion;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod partitioned;
pub mod pool;
pub mod scatter;
pub mod solver;

pub use config::{ConfigError, SolveConfig};
pub use diffusion::{solve_diffusion, DiffusionSolver, Problem, Solution};
pub use error::SolveError;
pub use metrics::SolveMetrics;
pub use partitioned::{block_ranges, RowPartitionedMatrix};
pub use pool::{PoolError, WorkerPool};
