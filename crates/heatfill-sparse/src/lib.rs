//! Sparse linear algebra for heatfill.
//!
//! - [`SparseSystem`]: the assembled `A x = b` in coordinate-triple form.
//! - [`LinearOperator`]: the matrix-as-a-function seam between the
//!   row-partitioned matrix and the iterative solver.
//! - [`conjugate_gradient`]: the iterative solve.
//! - [`Backend`]: injected vector arithmetic and direct sparse solve;
//!   [`CpuBackend`] is the shipped implementation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod cg;
pub mod operator;
pub mod system;

pub use backend::{Backend, CpuBackend};
pub use cg::{conjugate_gradient, CgOptions, CgOutcome, ConvergenceInfo};
pub use operator::LinearOperator;
pub use system::{spmv, SparseSystem};
