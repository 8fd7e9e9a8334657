//! Core types and traits for the heatfill diffusion solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: the [`Coord`]
//! offset type, solve-method selectors, subsystem error enums, and the
//! [`SolveObserver`] diagnostic sink.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod method;
pub mod observer;

pub use error::{LinalgError, SpaceError};
pub use method::{NonConvergence, Preconditioner, SolveMethod};
pub use observer::{LogObserver, NullObserver, SolveEvent, SolveObserver};

/// An integer grid coordinate or offset vector.
///
/// Inline storage covers grids of up to four dimensions without a heap
/// allocation; higher-dimensional grids spill transparently.
pub type Coord = smallvec::SmallVec<[i32; 4]>;
