//! Top-level error returned by a diffusion solve.

use std::error::Error;
use std::fmt;

use heatfill_core::{LinalgError, SpaceError};

use crate::config::ConfigError;
use crate::gate::GateError;
use crate::pool::PoolError;

/// Why a solve produced no grid.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The mask or conductivity field does not fit the grid.
    InputShape(SpaceError),
    /// More unknown cells than the 31-bit index space can address.
    CapacityExceeded {
        /// Unknown cells in the mask.
        unknowns: usize,
        /// Largest supported count.
        max: usize,
    },
    /// Neither the iterative nor the direct solve produced an
    /// acceptable solution.
    LinearSystemUnsolvable(LinalgError),
    /// A worker task failed or the pool could not run it.
    WorkerFailed {
        /// Description of the failure.
        reason: String,
    },
    /// The configuration failed validation.
    Config(ConfigError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputShape(e) => write!(f, "invalid input: {e}"),
            Self::CapacityExceeded { unknowns, max } => {
                write!(f, "{unknowns} unknown cells exceed the supported maximum of {max}")
            }
            Self::LinearSystemUnsolvable(e) => write!(f, "linear system unsolvable: {e}"),
            Self::WorkerFailed { reason } => write!(f, "worker failed: {reason}"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InputShape(e) => Some(e),
            Self::LinearSystemUnsolvable(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::CapacityExceeded { .. } | Self::WorkerFailed { .. } => None,
        }
    }
}

impl From<SpaceError> for SolveError {
    fn from(e: SpaceError) -> Self {
        match e {
            SpaceError::CapacityExceeded { unknowns, max } => {
                Self::CapacityExceeded { unknowns, max }
            }
            other => Self::InputShape(other),
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PoolError> for SolveError {
    fn from(e: PoolError) -> Self {
        Self::WorkerFailed {
            reason: e.to_string(),
        }
    }
}

impl From<GateError> for SolveError {
    fn from(e: GateError) -> Self {
        Self::WorkerFailed {
            reason: e.to_string(),
        }
    }
}

impl From<LinalgError> for SolveError {
    /// Operator failures come from worker tasks; everything else means
    /// the system could not be solved.
    fn from(e: LinalgError) -> Self {
        match e {
            LinalgError::OperatorFailed { reason } => Self::WorkerFailed { reason },
            other => Self::LinearSystemUnsolvable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_space_error_maps_to_capacity_variant() {
        let e: SolveError = SpaceError::CapacityExceeded {
            unknowns: 10,
            max: 5,
        }
        .into();
        assert_eq!(
            e,
            SolveError::CapacityExceeded {
                unknowns: 10,
                max: 5
            }
        );
        assert!(e.source().is_none());
    }

    #[test]
    fn shape_errors_keep_their_source() {
        let e: SolveError = SpaceError::ZeroDimensional.into();
        assert!(matches!(e, SolveError::InputShape(SpaceError::ZeroDimensional)));
        assert!(e.source().is_some());
    }

    #[test]
    fn operator_failure_is_a_worker_failure() {
        let e: SolveError = LinalgError::OperatorFailed {
            reason: "block 2 panicked".into(),
        }
        .into();
        assert_eq!(
            e,
            SolveError::WorkerFailed {
                reason: "block 2 panicked".into()
            }
        );
        let e: SolveError = LinalgError::SingularMatrix { index: 3 }.into();
        assert!(matches!(e, SolveError::LinearSystemUnsolvable(_)));
    }
}
