//! Error types shared across the heatfill workspace.
//!
//! Organized by subsystem: grid/stencil construction ([`SpaceError`]) and
//! sparse linear algebra ([`LinalgError`]). The engine crate wraps both in
//! its top-level `SolveError`.

use std::error::Error;
use std::fmt;

/// Errors from index mapping, stencil generation and input validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpaceError {
    /// Two arrays that must share a shape do not.
    ShapeMismatch {
        /// Shape of the reference array (the grid).
        expected: Vec<usize>,
        /// Shape that was supplied.
        actual: Vec<usize>,
    },
    /// An array cannot be broadcast to the grid shape.
    NotBroadcastable {
        /// Shape of the array being broadcast.
        from: Vec<usize>,
        /// Target grid shape.
        to: Vec<usize>,
    },
    /// More unknown cells than the 31-bit index space can address.
    CapacityExceeded {
        /// Number of unknown cells found in the mask.
        unknowns: usize,
        /// Largest supported unknown count.
        max: usize,
    },
    /// A grid axis is too long for `i32` coordinates.
    DimensionTooLarge {
        /// Index of the offending axis.
        axis: usize,
        /// Length of that axis.
        len: usize,
    },
    /// A grid or stencil with zero dimensions was requested.
    ZeroDimensional,
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected:?}, got {actual:?}")
            }
            Self::NotBroadcastable { from, to } => {
                write!(f, "shape {from:?} cannot be broadcast to {to:?}")
            }
            Self::CapacityExceeded { unknowns, max } => {
                write!(f, "{unknowns} unknown cells exceed the supported maximum of {max}")
            }
            Self::DimensionTooLarge { axis, len } => {
                write!(f, "axis {axis} has length {len}, exceeding i32::MAX")
            }
            Self::ZeroDimensional => write!(f, "grid must have at least one dimension"),
        }
    }
}

impl Error for SpaceError {}

/// Errors from sparse assembly, operators and linear solves.
#[derive(Clone, Debug, PartialEq)]
pub enum LinalgError {
    /// Vector or matrix dimensions disagree.
    DimensionMismatch {
        /// Length the operation expected.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
    /// The factorization hit a zero pivot.
    SingularMatrix {
        /// Row (in factorization order) of the zero pivot.
        index: usize,
    },
    /// The computed solution contains NaN or infinity.
    NonFinite {
        /// Index of the first non-finite entry.
        index: usize,
    },
    /// The computed solution does not satisfy the system.
    ResidualTooLarge {
        /// Relative residual `‖b − Ax‖ / ‖b‖` of the candidate.
        residual: f64,
        /// Accepted relative residual.
        tolerance: f64,
    },
    /// The matrix operator could not produce a product
    /// (e.g. a worker task failed).
    OperatorFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            Self::SingularMatrix { index } => {
                write!(f, "matrix is singular (zero pivot at {index})")
            }
            Self::NonFinite { index } => {
                write!(f, "solution is not finite at index {index}")
            }
            Self::ResidualTooLarge {
                residual,
                tolerance,
            } => write!(
                f,
                "relative residual {residual:.3e} exceeds tolerance {tolerance:.3e}"
            ),
            Self::OperatorFailed { reason } => write!(f, "operator failed: {reason}"),
        }
    }
}

impl Error for LinalgError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_counts() {
        let e = SpaceError::CapacityExceeded {
            unknowns: 1 << 31,
            max: i32::MAX as usize,
        };
        let msg = e.to_string();
        assert!(msg.contains("2147483648"));
        assert!(msg.contains("2147483647"));
    }

    #[test]
    fn residual_message_uses_scientific_notation() {
        let e = LinalgError::ResidualTooLarge {
            residual: 0.5,
            tolerance: 1e-6,
        };
        assert_eq!(
            e.to_string(),
            "relative residual 5.000e-1 exceeds tolerance 1.000e-6"
        );
    }
}
