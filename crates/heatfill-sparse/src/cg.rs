//! Conjugate gradient for symmetric positive-definite operators.
//!
//! ```text
//! x = 0, r = b
//! for k in 0..max_iterations:
//!     if ‖r‖ ≤ rtol·‖b‖: converged
//!     z   = M⁻¹ r           (z = r without a preconditioner)
//!     ρ   = r·z
//!     p   = z + (ρ / ρ_prev)·p   (p = z on the first step)
//!     q   = A p
//!     α   = ρ / (p·q)
//!     x  += α p
//!     r  -= α q
//! ```
//!
//! Non-convergence is not an error: the outcome reports why the iteration
//! stopped so the caller can fall back to a direct solve. Only operator
//! failures and dimension mismatches surface as [`LinalgError`].

use heatfill_core::{LinalgError, NonConvergence, Preconditioner};

use crate::backend::Backend;
use crate::operator::LinearOperator;

/// Iteration controls.
#[derive(Clone, Debug, PartialEq)]
pub struct CgOptions {
    /// Relative residual target `‖b − Ax‖ / ‖b‖`.
    pub tolerance: f64,
    /// Iteration cap. `None` means `10 × size`.
    pub max_iterations: Option<usize>,
    /// Preconditioner applied to each residual.
    pub preconditioner: Preconditioner,
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: None,
            preconditioner: Preconditioner::None,
        }
    }
}

impl CgOptions {
    /// Iteration cap for an operator of dimension `size`.
    pub fn resolved_max_iterations(&self, size: usize) -> usize {
        self.max_iterations.unwrap_or(size.saturating_mul(10))
    }
}

/// How the iteration ended.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceInfo {
    /// Operator applications performed.
    pub iterations: usize,
    /// Final relative residual (recurrence estimate).
    pub residual: f64,
    /// `true` when the residual target was met.
    pub converged: bool,
    /// Why the iteration stopped short, when it did.
    pub cause: Option<NonConvergence>,
}

/// Result of a conjugate gradient run.
#[derive(Clone, Debug, PartialEq)]
pub struct CgOutcome {
    /// Last iterate. Only meaningful when `info.converged`.
    pub solution: Vec<f64>,
    /// Convergence report.
    pub info: ConvergenceInfo,
}

impl CgOutcome {
    fn stopped(solution: Vec<f64>, iterations: usize, residual: f64, cause: NonConvergence) -> Self {
        Self {
            solution,
            info: ConvergenceInfo {
                iterations,
                residual,
                converged: false,
                cause: Some(cause),
            },
        }
    }

    fn converged(solution: Vec<f64>, iterations: usize, residual: f64) -> Self {
        Self {
            solution,
            info: ConvergenceInfo {
                iterations,
                residual,
                converged: true,
                cause: None,
            },
        }
    }
}

/// Solve `op · x = rhs` starting from `x = 0`.
///
/// A non-positive or non-finite diagonal entry stops the iteration
/// before it starts with [`NonConvergence::SingularRow`]; such a row
/// cannot belong to a positive-definite matrix.
pub fn conjugate_gradient(
    op: &dyn LinearOperator,
    rhs: &[f64],
    options: &CgOptions,
    backend: &dyn Backend,
) -> Result<CgOutcome, LinalgError> {
    let n = op.size();
    if rhs.len() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            actual: rhs.len(),
        });
    }

    let diag = op.diagonal();
    let mut x = backend.zeros(n);
    if diag.iter().any(|&d| d <= 0.0 || !d.is_finite()) {
        return Ok(CgOutcome::stopped(x, 0, f64::INFINITY, NonConvergence::SingularRow));
    }

    let b_norm = backend.norm(rhs);
    if !b_norm.is_finite() {
        return Ok(CgOutcome::stopped(x, 0, f64::INFINITY, NonConvergence::Breakdown));
    }
    if b_norm == 0.0 {
        return Ok(CgOutcome::converged(x, 0, 0.0));
    }

    let threshold = options.tolerance * b_norm;
    let max_iterations = options.resolved_max_iterations(n);
    let inverse_diag = match options.preconditioner {
        Preconditioner::Jacobi => {
            let mut inv = backend.zeros(n);
            backend.div_elementwise(&backend.full(n, 1.0), &diag, &mut inv);
            Some(inv)
        }
        Preconditioner::None => None,
    };

    let mut r = rhs.to_vec();
    let mut z = backend.zeros(n);
    let mut p = backend.zeros(n);
    let mut rho_prev = 0.0;
    let mut r_norm = b_norm;

    for k in 0..max_iterations {
        if r_norm <= threshold {
            return Ok(CgOutcome::converged(x, k, r_norm / b_norm));
        }

        match &inverse_diag {
            Some(inv) => backend.mul_elementwise(&r, inv, &mut z),
            None => z.copy_from_slice(&r),
        }
        let rho = backend.dot(&r, &z);
        if k == 0 {
            p.copy_from_slice(&z);
        } else {
            backend.xpay(&z, rho / rho_prev, &mut p);
        }

        let q = op.apply(&p)?;
        if q.len() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                actual: q.len(),
            });
        }
        let pq = backend.dot(&p, &q);
        if pq <= 0.0 || !pq.is_finite() || !rho.is_finite() {
            return Ok(CgOutcome::stopped(x, k + 1, r_norm / b_norm, NonConvergence::Breakdown));
        }
        let alpha = rho / pq;
        backend.axpy(alpha, &p, &mut x);
        backend.axpy(-alpha, &q, &mut r);
        rho_prev = rho;
        r_norm = backend.norm(&r);
        if !r_norm.is_finite() {
            return Ok(CgOutcome::stopped(x, k + 1, f64::INFINITY, NonConvergence::Breakdown));
        }
    }

    if r_norm <= threshold {
        Ok(CgOutcome::converged(x, max_iterations, r_norm / b_norm))
    } else {
        Ok(CgOutcome::stopped(
            x,
            max_iterations,
            r_norm / b_norm,
            NonConvergence::IterationLimit,
        ))
    }
}
