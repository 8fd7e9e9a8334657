//! Heatfill: fill the unknown cells of an N-dimensional grid with the
//! steady state of discrete diffusion from its fixed cells.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all heatfill sub-crates. For most users, adding `heatfill` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use heatfill::prelude::*;
//! use ndarray::{Array, IxDyn};
//!
//! // A 10-cell line held at 0 on both ends with a unit source inside.
//! let mut grid = Array::<f64, _>::zeros(IxDyn(&[10]));
//! let mut fixed = Array::from_elem(IxDyn(&[10]), false);
//! for i in 1..9 {
//!     grid[[i]] = 1.0;
//! }
//! fixed[[0]] = true;
//! fixed[[9]] = true;
//!
//! let out = solve_diffusion(grid.view(), fixed.view(), None, 1, 4).unwrap();
//! for i in 0..10 {
//!     let d = i as f64 - 4.5;
//!     assert!((out[[i]] - (0.5 * 4.5 * 4.5 - 0.5 * d * d)).abs() < 0.01);
//! }
//!
//! // The same solve with explicit settings and metrics.
//! let config = SolveConfig { method: SolveMethod::Direct, ..SolveConfig::default() };
//! let solution = DiffusionSolver::new(config)
//!     .unwrap()
//!     .with_observer(std::sync::Arc::new(NullObserver))
//!     .solve(&Problem::new(grid.view(), fixed.view()))
//!     .unwrap();
//! assert_eq!(solution.metrics.unknowns, 8);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `heatfill-core` | Errors, solve methods, diagnostic events and observers |
//! | [`space`] | `heatfill-space` | Unknown index map and neighbour stencils |
//! | [`sparse`] | `heatfill-sparse` | Sparse systems, operators, CG and backends |
//! | [`engine`] | `heatfill-engine` | Worker pool, assembly, partitioned matrix, solve pipeline |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared types (`heatfill-core`).
///
/// Error enums, [`types::SolveMethod`], and the diagnostic
/// [`types::SolveEvent`] stream with its [`types::SolveObserver`] sinks.
pub use heatfill_core as types;

/// Grid indexing and stencils (`heatfill-space`).
///
/// [`space::UnknownIndexMap`] compacts unknown cells; [`space::Stencil`]
/// enumerates neighbour offsets within a squared radius.
pub use heatfill_space as space;

/// Sparse linear algebra (`heatfill-sparse`).
///
/// [`sparse::SparseSystem`], [`sparse::conjugate_gradient`] and the
/// [`sparse::Backend`] capability with its [`sparse::CpuBackend`].
pub use heatfill_sparse as sparse;

/// The solve pipeline (`heatfill-engine`).
///
/// [`engine::DiffusionSolver`] for configured solves,
/// [`engine::solve_diffusion`] for the one-call form.
pub use heatfill_engine as engine;

pub use heatfill_engine::solve_diffusion;

/// Common imports for typical heatfill usage.
///
/// ```rust
/// use heatfill::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use heatfill_core::{
        LinalgError, LogObserver, NullObserver, Preconditioner, SolveEvent, SolveMethod,
        SolveObserver, SpaceError,
    };

    // Backends
    pub use heatfill_sparse::{Backend, CpuBackend};

    // Engine
    pub use heatfill_engine::{
        solve_diffusion, ConfigError, DiffusionSolver, Problem, Solution, SolveConfig, SolveError,
        SolveMetrics,
    };
}
