//! Solve configuration, validation, and error types.
//!
//! [`SolveConfig`] is the input to
//! [`DiffusionSolver::new`](crate::DiffusionSolver::new), which calls
//! [`validate()`](SolveConfig::validate) once up front.

use std::error::Error;
use std::fmt;

use heatfill_core::{Preconditioner, SolveMethod};
use heatfill_sparse::CgOptions;

/// Worker pool size used when neither an explicit count nor
/// `available_parallelism` is available.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Upper bound applied to every resolved worker count.
pub const MAX_WORKER_COUNT: usize = 64;

// ── SolveConfig ────────────────────────────────────────────────────

/// Parameters of a diffusion solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveConfig {
    /// Maximum squared offset length `r`; neighbours are every non-zero
    /// integer offset `o` with `‖o‖² ≤ r`. Default: 1 (axis neighbours).
    pub neighbor_distance: u32,
    /// Worker threads for assembly and matrix products. `None` =
    /// auto-detect from `available_parallelism`. Clamped to `[1, 64]`.
    /// Default: `Some(4)`.
    pub worker_count: Option<usize>,
    /// Row blocks of the partitioned matrix. `None` = the resolved worker
    /// count. Clamped to `[1, K]` at matrix construction.
    pub block_count: Option<usize>,
    /// Conjugate gradient relative residual target. Default: `1e-6`.
    pub tolerance: f64,
    /// Conjugate gradient iteration cap. `None` = `10 × K`.
    pub max_iterations: Option<usize>,
    /// Solve strategy. Default: conjugate gradient with direct fallback.
    pub method: SolveMethod,
    /// Conjugate gradient preconditioner. Default: none.
    pub preconditioner: Preconditioner,
    /// Largest relative residual accepted from the direct solve.
    /// Default: `1e-6`.
    pub direct_tolerance: f64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            neighbor_distance: 1,
            worker_count: Some(DEFAULT_WORKER_COUNT),
            block_count: None,
            tolerance: 1e-6,
            max_iterations: None,
            method: SolveMethod::ConjugateGradient,
            preconditioner: Preconditioner::None,
            direct_tolerance: 1e-6,
        }
    }
}

impl SolveConfig {
    /// Check every field; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.neighbor_distance == 0 {
            return Err(ConfigError::InvalidNeighborDistance {
                value: self.neighbor_distance,
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(ConfigError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        if !(self.direct_tolerance.is_finite() && self.direct_tolerance > 0.0) {
            return Err(ConfigError::InvalidDirectTolerance {
                value: self.direct_tolerance,
            });
        }
        if self.block_count == Some(0) {
            return Err(ConfigError::ZeroBlockCount);
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::ZeroMaxIterations);
        }
        Ok(())
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, MAX_WORKER_COUNT),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_WORKER_COUNT)
                .clamp(1, MAX_WORKER_COUNT),
        }
    }

    /// Requested row-block count before clamping to the unknown count.
    pub fn resolved_block_count(&self) -> usize {
        self.block_count
            .unwrap_or_else(|| self.resolved_worker_count())
            .max(1)
    }

    /// Iteration controls for the conjugate gradient stage.
    pub fn cg_options(&self) -> CgOptions {
        CgOptions {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            preconditioner: self.preconditioner,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SolveConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `neighbor_distance` is zero, which yields no neighbours at all.
    InvalidNeighborDistance {
        /// The invalid value.
        value: u32,
    },
    /// `tolerance` is NaN, infinite, or outside `(0, 1)`.
    InvalidTolerance {
        /// The invalid value.
        value: f64,
    },
    /// `direct_tolerance` is NaN, infinite, zero, or negative.
    InvalidDirectTolerance {
        /// The invalid value.
        value: f64,
    },
    /// `block_count` is `Some(0)`.
    ZeroBlockCount,
    /// `max_iterations` is `Some(0)`.
    ZeroMaxIterations,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNeighborDistance { value } => {
                write!(f, "neighbor_distance must be at least 1, got {value}")
            }
            Self::InvalidTolerance { value } => {
                write!(f, "tolerance must be finite and in (0, 1), got {value}")
            }
            Self::InvalidDirectTolerance { value } => {
                write!(f, "direct_tolerance must be finite and positive, got {value}")
            }
            Self::ZeroBlockCount => write!(f, "block_count must be at least 1"),
            Self::ZeroMaxIterations => write!(f, "max_iterations must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SolveConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.resolved_worker_count(), 4);
        assert_eq!(cfg.resolved_block_count(), 4);
    }

    #[test]
    fn worker_count_is_clamped() {
        let mut cfg = SolveConfig {
            worker_count: Some(0),
            ..SolveConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), 1);
        cfg.worker_count = Some(1000);
        assert_eq!(cfg.resolved_worker_count(), 64);
        cfg.worker_count = None;
        let auto = cfg.resolved_worker_count();
        assert!((1..=64).contains(&auto));
    }

    #[test]
    fn explicit_block_count_overrides_workers() {
        let cfg = SolveConfig {
            block_count: Some(7),
            ..SolveConfig::default()
        };
        assert_eq!(cfg.resolved_block_count(), 7);
    }

    #[test]
    fn zero_radius_rejected() {
        let cfg = SolveConfig {
            neighbor_distance: 0,
            ..SolveConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidNeighborDistance { value: 0 })
        );
    }

    #[test]
    fn tolerance_bounds() {
        for bad in [0.0, 1.0, -1e-3, f64::NAN, f64::INFINITY] {
            let cfg = SolveConfig {
                tolerance: bad,
                ..SolveConfig::default()
            };
            match cfg.validate() {
                Err(ConfigError::InvalidTolerance { .. }) => {}
                other => panic!("expected InvalidTolerance for {bad}, got {other:?}"),
            }
        }
        let cfg = SolveConfig {
            direct_tolerance: 0.0,
            ..SolveConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDirectTolerance { .. })
        ));
    }

    #[test]
    fn zero_counts_rejected() {
        let cfg = SolveConfig {
            block_count: Some(0),
            ..SolveConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBlockCount));
        let cfg = SolveConfig {
            max_iterations: Some(0),
            ..SolveConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroMaxIterations));
    }

    #[test]
    fn cg_options_carry_solver_fields() {
        let cfg = SolveConfig {
            tolerance: 1e-9,
            max_iterations: Some(50),
            preconditioner: Preconditioner::Jacobi,
            ..SolveConfig::default()
        };
        let opts = cfg.cg_options();
        assert_eq!(opts.tolerance, 1e-9);
        assert_eq!(opts.max_iterations, Some(50));
        assert_eq!(opts.preconditioner, Preconditioner::Jacobi);
    }
}
