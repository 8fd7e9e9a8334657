//! Structured diagnostic events and the injected observer sink.
//!
//! Solves never write to a global logger directly. Every diagnostic is a
//! [`SolveEvent`] handed to the [`SolveObserver`] the caller injected.
//! [`LogObserver`] forwards events to the `log` facade; [`NullObserver`]
//! drops them.

use crate::method::{NonConvergence, SolveMethod};

/// A diagnostic emitted at a stage boundary of a solve.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveEvent {
    /// The neighbour stencil has been generated.
    StencilBuilt {
        /// Number of non-zero offsets in the stencil.
        offsets: usize,
        /// Maximum squared offset length.
        neighbor_distance: u32,
    },
    /// All offsets have been merged into the sparse system.
    SystemAssembled {
        /// Number of unknown cells (matrix dimension).
        unknowns: usize,
        /// Number of stored triples, diagonal included.
        nnz: usize,
        /// Bytes held by the triples and right-hand side.
        bytes: usize,
    },
    /// The iterative solver did not reach tolerance; a direct solve follows.
    IterativeNotConverged {
        /// Why the iteration stopped.
        cause: NonConvergence,
        /// Iterations performed before giving up.
        iterations: usize,
        /// Relative residual at the point of giving up.
        residual: f64,
    },
    /// The direct fallback produced the accepted solution.
    FallbackSolved {
        /// Relative residual of the direct solution.
        residual: f64,
    },
    /// The solve finished and the grid has been populated.
    Solved {
        /// Number of unknown cells solved for.
        unknowns: usize,
        /// Method whose result was accepted.
        method: SolveMethod,
        /// Conjugate gradient iterations (0 for direct-only solves).
        iterations: usize,
        /// Wall-clock time of the whole solve, in microseconds.
        elapsed_us: u64,
    },
}

/// Sink for [`SolveEvent`]s.
///
/// Called from the thread that drives the solve, never from pool workers.
pub trait SolveObserver: Send + Sync {
    /// Receive one event.
    fn on_event(&self, event: &SolveEvent);
}

/// Forwards events to the `log` crate.
///
/// Stage progress goes to `debug`/`info`, iterative non-convergence to
/// `warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl SolveObserver for LogObserver {
    fn on_event(&self, event: &SolveEvent) {
        match event {
            SolveEvent::StencilBuilt {
                offsets,
                neighbor_distance,
            } => {
                log::debug!("using {offsets} neighbours with squared distance <= {neighbor_distance}");
            }
            SolveEvent::SystemAssembled {
                unknowns,
                nnz,
                bytes,
            } => {
                let gib = *bytes as f64 / (1024.0 * 1024.0 * 1024.0);
                log::debug!(
                    "solving linear system of size {unknowns}x{unknowns} with {nnz} non-zero entries, used memory {gib:.3} GiB"
                );
            }
            SolveEvent::IterativeNotConverged {
                cause,
                iterations,
                residual,
            } => {
                log::warn!(
                    "conjugate gradient did not converge ({cause}, {iterations} iterations, residual {residual:.3e}), falling back to direct solve"
                );
            }
            SolveEvent::FallbackSolved { residual } => {
                log::info!("direct fallback solved system, residual {residual:.3e}");
            }
            SolveEvent::Solved {
                unknowns,
                method,
                iterations,
                elapsed_us,
            } => {
                log::info!(
                    "solved {unknowns} unknowns via {method} ({iterations} iterations) in {elapsed_us} us"
                );
            }
        }
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SolveObserver for NullObserver {
    fn on_event(&self, _event: &SolveEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn observers_are_object_safe_and_shareable() {
        let sinks: Vec<Arc<dyn SolveObserver>> = vec![Arc::new(LogObserver), Arc::new(NullObserver)];
        let event = SolveEvent::IterativeNotConverged {
            cause: NonConvergence::IterationLimit,
            iterations: 10,
            residual: 0.25,
        };
        for sink in &sinks {
            sink.on_event(&event);
        }
    }
}
