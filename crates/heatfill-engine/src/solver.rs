//! Linear solve strategy: conjugate gradient with a direct fallback.

use heatfill_core::{SolveEvent, SolveMethod, SolveObserver};
use heatfill_sparse::{conjugate_gradient, Backend, CgOptions, SparseSystem};

use crate::error::SolveError;
use crate::partitioned::RowPartitionedMatrix;

/// Accepted solution of the linear system.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSolution {
    /// Unknown values, in unknown-index order.
    pub values: Vec<f64>,
    /// Method whose result was accepted.
    pub method: SolveMethod,
    /// Conjugate gradient iterations performed (0 for direct-only).
    pub iterations: usize,
    /// Relative residual of the accepted result.
    pub residual: f64,
    /// `true` when conjugate gradient failed and the direct result was used.
    pub fell_back: bool,
}

/// Runs the configured strategy against an assembled system.
pub struct LinearSolver<'a> {
    method: SolveMethod,
    cg: CgOptions,
    direct_tolerance: f64,
    backend: &'a dyn Backend,
    observer: &'a dyn SolveObserver,
}

impl<'a> LinearSolver<'a> {
    /// Create a solver.
    pub fn new(
        method: SolveMethod,
        cg: CgOptions,
        direct_tolerance: f64,
        backend: &'a dyn Backend,
        observer: &'a dyn SolveObserver,
    ) -> Self {
        Self {
            method,
            cg,
            direct_tolerance,
            backend,
            observer,
        }
    }

    /// Solve `matrix · x = system.rhs()`.
    ///
    /// Products go through `matrix`; the direct path factorizes `system`.
    pub fn solve(
        &self,
        matrix: &RowPartitionedMatrix,
        system: &SparseSystem,
    ) -> Result<LinearSolution, SolveError> {
        if self.method == SolveMethod::Direct {
            return self.direct(system, 0, false);
        }

        let outcome = conjugate_gradient(matrix, system.rhs(), &self.cg, self.backend)?;
        let info = outcome.info;
        if info.converged {
            return Ok(LinearSolution {
                values: outcome.solution,
                method: SolveMethod::ConjugateGradient,
                iterations: info.iterations,
                residual: info.residual,
                fell_back: false,
            });
        }

        if let Some(cause) = info.cause {
            self.observer.on_event(&SolveEvent::IterativeNotConverged {
                cause,
                iterations: info.iterations,
                residual: info.residual,
            });
        }
        let solution = self.direct(system, info.iterations, true)?;
        self.observer.on_event(&SolveEvent::FallbackSolved {
            residual: solution.residual,
        });
        Ok(solution)
    }

    fn direct(
        &self,
        system: &SparseSystem,
        iterations: usize,
        fell_back: bool,
    ) -> Result<LinearSolution, SolveError> {
        let values = self
            .backend
            .direct_solve(system)
            .map_err(SolveError::LinearSystemUnsolvable)?;
        let residual = system
            .verify_solution(&values, self.direct_tolerance)
            .map_err(SolveError::LinearSystemUnsolvable)?;
        Ok(LinearSolution {
            values,
            method: SolveMethod::Direct,
            iterations,
            residual,
            fell_back,
        })
    }
}
