//! The end-to-end diffusion solve.
//!
//! [`DiffusionSolver::solve`] runs the pipeline
//! index map → stencil → parallel assembly → row-partitioned matrix →
//! linear solve → scatter, reporting progress to the injected
//! [`SolveObserver`] and timing into [`SolveMetrics`]. The worker pool
//! lives for exactly one solve.

use std::sync::Arc;
use std::time::Instant;

use heatfill_core::{LogObserver, SolveEvent, SolveObserver, SpaceError};
use heatfill_space::{Stencil, UnknownIndexMap};
use heatfill_sparse::{Backend, CpuBackend};
use ndarray::{ArrayD, ArrayViewD};

use crate::assemble::{assemble, AssemblyContext};
use crate::config::SolveConfig;
use crate::error::SolveError;
use crate::metrics::SolveMetrics;
use crate::partitioned::RowPartitionedMatrix;
use crate::pool::WorkerPool;
use crate::scatter::scatter;
use crate::solver::LinearSolver;

/// Inputs of one solve, borrowed from the caller.
#[derive(Clone, Debug)]
pub struct Problem<'a> {
    grid: ArrayViewD<'a, f64>,
    fixed: ArrayViewD<'a, bool>,
    conductivity: Option<ArrayViewD<'a, f64>>,
}

impl<'a> Problem<'a> {
    /// A grid and its fixed mask (`true` = boundary value).
    pub fn new(grid: ArrayViewD<'a, f64>, fixed: ArrayViewD<'a, bool>) -> Self {
        Self {
            grid,
            fixed,
            conductivity: None,
        }
    }

    /// Attach a conductivity field broadcastable to the grid shape.
    pub fn with_conductivity(mut self, conductivity: ArrayViewD<'a, f64>) -> Self {
        self.conductivity = Some(conductivity);
        self
    }

    /// The input grid.
    pub fn grid(&self) -> &ArrayViewD<'a, f64> {
        &self.grid
    }

    /// The fixed mask.
    pub fn fixed(&self) -> &ArrayViewD<'a, bool> {
        &self.fixed
    }

    /// The conductivity field, if any.
    pub fn conductivity(&self) -> Option<&ArrayViewD<'a, f64>> {
        self.conductivity.as_ref()
    }
}

/// Output of a solve.
#[derive(Clone, Debug)]
pub struct Solution {
    /// The input grid with every unknown cell replaced by its solved value.
    pub grid: ArrayD<f64>,
    /// What the solve did and how long it took.
    pub metrics: SolveMetrics,
}

/// Configured entry point for diffusion solves.
///
/// # Examples
///
/// ```
/// use heatfill_engine::{DiffusionSolver, Problem, SolveConfig};
/// use ndarray::arr1;
///
/// let grid = arr1(&[0.0, 0.0, 0.0, 1.0]).into_dyn();
/// let fixed = arr1(&[true, false, false, true]).into_dyn();
/// let solver = DiffusionSolver::new(SolveConfig::default()).unwrap();
/// let out = solver.solve(&Problem::new(grid.view(), fixed.view())).unwrap();
/// assert!((out.grid[[1]] - 1.0 / 3.0).abs() < 1e-6);
/// ```
pub struct DiffusionSolver {
    config: SolveConfig,
    backend: Arc<dyn Backend>,
    observer: Arc<dyn SolveObserver>,
}

impl DiffusionSolver {
    /// Validate `config` and create a solver using [`CpuBackend`] and
    /// [`LogObserver`].
    pub fn new(config: SolveConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self {
            config,
            backend: Arc::new(CpuBackend),
            observer: Arc::new(LogObserver),
        })
    }

    /// Replace the linear-algebra backend.
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the diagnostic sink.
    pub fn with_observer(mut self, observer: Arc<dyn SolveObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// Solve `problem`. The caller's arrays are never modified.
    pub fn solve(&self, problem: &Problem<'_>) -> Result<Solution, SolveError> {
        let start = Instant::now();
        let mut metrics = SolveMetrics::default();

        let grid = problem.grid.view();
        if problem.fixed.shape() != grid.shape() {
            return Err(SpaceError::ShapeMismatch {
                expected: grid.shape().to_vec(),
                actual: problem.fixed.shape().to_vec(),
            }
            .into());
        }

        let t = Instant::now();
        let map = UnknownIndexMap::build(problem.fixed.view())?;
        metrics.index_us = micros(t);
        metrics.unknowns = map.unknown_count();

        let conductivity = problem.conductivity.as_ref().map(|c| c.view());
        let ctx = Arc::new(AssemblyContext::new(map, grid.view(), conductivity)?);

        if ctx.map().unknown_count() == 0 {
            let out = scatter(grid, ctx.map(), &[])?;
            metrics.total_us = micros(start);
            return Ok(self.finish(out, metrics));
        }

        let stencil = Stencil::new(grid.ndim(), self.config.neighbor_distance)?;
        metrics.offsets = stencil.len();
        self.observer.on_event(&SolveEvent::StencilBuilt {
            offsets: stencil.len(),
            neighbor_distance: self.config.neighbor_distance,
        });

        let workers = self.config.resolved_worker_count();
        metrics.workers = workers;
        let pool = Arc::new(WorkerPool::new(workers)?);

        let t = Instant::now();
        let system = Arc::new(assemble(&ctx, &stencil, &pool)?);
        metrics.assembly_us = micros(t);
        metrics.nnz = system.nnz();
        metrics.system_bytes = system.memory_bytes();
        self.observer.on_event(&SolveEvent::SystemAssembled {
            unknowns: system.size(),
            nnz: system.nnz(),
            bytes: system.memory_bytes(),
        });

        let t = Instant::now();
        let matrix = RowPartitionedMatrix::new(
            Arc::clone(&system),
            self.config.resolved_block_count(),
            pool,
            Arc::clone(&self.backend),
        )?;
        metrics.matrix_us = micros(t);
        metrics.blocks = matrix.block_count();

        let t = Instant::now();
        let solver = LinearSolver::new(
            self.config.method,
            self.config.cg_options(),
            self.config.direct_tolerance,
            self.backend.as_ref(),
            self.observer.as_ref(),
        );
        let solved = solver.solve(&matrix, &system);
        matrix.close();
        let solved = solved?;
        metrics.solve_us = micros(t);
        metrics.iterations = solved.iterations;
        metrics.residual = solved.residual;
        metrics.method = solved.method;
        metrics.fell_back = solved.fell_back;

        let out = scatter(grid, ctx.map(), &solved.values)?;
        metrics.total_us = micros(start);
        Ok(self.finish(out, metrics))
    }

    fn finish(&self, grid: ArrayD<f64>, metrics: SolveMetrics) -> Solution {
        self.observer.on_event(&SolveEvent::Solved {
            unknowns: metrics.unknowns,
            method: metrics.method,
            iterations: metrics.iterations,
            elapsed_us: metrics.total_us,
        });
        Solution { grid, metrics }
    }
}

impl std::fmt::Debug for DiffusionSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffusionSolver")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

/// Solve with default settings apart from the neighbour radius and the
/// worker count.
///
/// Unknown cells (`fixed == false`) take the steady state of the
/// weighted neighbour average; the value they hold in `grid` acts as a
/// constant source term. `neighbor_distance` is the maximum squared
/// offset length and `max_workers` the pool size.
pub fn solve_diffusion<'a>(
    grid: ArrayViewD<'a, f64>,
    fixed: ArrayViewD<'a, bool>,
    conductivity: Option<ArrayViewD<'a, f64>>,
    neighbor_distance: u32,
    max_workers: usize,
) -> Result<ArrayD<f64>, SolveError> {
    let config = SolveConfig {
        neighbor_distance,
        worker_count: Some(max_workers),
        ..SolveConfig::default()
    };
    let mut problem = Problem::new(grid, fixed);
    if let Some(c) = conductivity {
        problem = problem.with_conductivity(c);
    }
    DiffusionSolver::new(config)?
        .solve(&problem)
        .map(|solution| solution.grid)
}

fn micros(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatfill_core::SolveMethod;
    use ndarray::arr1;

    #[test]
    fn doc_example_three_cell_ramp() {
        let grid = arr1(&[0.0, 0.0, 0.0, 1.0]).into_dyn();
        let fixed = arr1(&[true, false, false, true]).into_dyn();
        let out = solve_diffusion(grid.view(), fixed.view(), None, 1, 2).unwrap();
        assert!((out[[1]] - 1.0 / 3.0).abs() < 1e-6);
        assert!((out[[2]] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let cfg = SolveConfig {
            neighbor_distance: 0,
            ..SolveConfig::default()
        };
        assert!(matches!(DiffusionSolver::new(cfg), Err(SolveError::Config(_))));
    }

    #[test]
    fn mask_shape_mismatch_is_an_input_error() {
        let grid = arr1(&[0.0, 0.0, 0.0]).into_dyn();
        let fixed = arr1(&[true, false]).into_dyn();
        let err = solve_diffusion(grid.view(), fixed.view(), None, 1, 1).unwrap_err();
        assert!(matches!(err, SolveError::InputShape(SpaceError::ShapeMismatch { .. })));
    }

    #[test]
    fn metrics_describe_the_solve() {
        let grid = arr1(&[0.0; 6]).into_dyn();
        let fixed = arr1(&[true, false, false, false, false, true]).into_dyn();
        let solver = DiffusionSolver::new(SolveConfig {
            worker_count: Some(2),
            ..SolveConfig::default()
        })
        .unwrap();
        let m = solver
            .solve(&Problem::new(grid.view(), fixed.view()))
            .unwrap()
            .metrics;
        assert_eq!(m.unknowns, 4);
        assert_eq!(m.offsets, 2);
        assert_eq!(m.nnz, 4 + 6);
        assert_eq!(m.blocks, 2);
        assert_eq!(m.workers, 2);
        assert_eq!(m.system_bytes, 10 * 16 + 4 * 8);
        assert_eq!(m.method, SolveMethod::ConjugateGradient);
    }
}
