//! Grid index algebra for heatfill.
//!
//! Two leaf components of the solve pipeline live here:
//!
//! - [`UnknownIndexMap`]: bidirectional mapping between dense row-major
//!   grid positions and the compacted `0..K` unknown-variable space.
//! - [`Stencil`]: the ordered set of integer neighbour offsets within a
//!   squared radius.
//!
//! Both are deterministic functions of their inputs; downstream
//! accumulation order depends on it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod index;
pub mod stencil;

#[cfg(test)]
pub(crate) mod compliance;

pub use index::{check_capacity, row_major_strides, UnknownIndexMap, MAX_UNKNOWNS};
pub use stencil::Stencil;
