//! Per-solve performance and convergence metrics.

use heatfill_core::SolveMethod;

/// Timing, size and convergence data collected during one solve.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveMetrics {
    /// Number of unknown cells `K`.
    pub unknowns: usize,
    /// Number of stencil offsets.
    pub offsets: usize,
    /// Stored triples, diagonal included.
    pub nnz: usize,
    /// Bytes held by the triples and right-hand side.
    pub system_bytes: usize,
    /// Row blocks of the partitioned matrix.
    pub blocks: usize,
    /// Worker threads used.
    pub workers: usize,
    /// Time spent building the unknown index map.
    pub index_us: u64,
    /// Time spent assembling the sparse system.
    pub assembly_us: u64,
    /// Time spent building the partitioned matrix.
    pub matrix_us: u64,
    /// Time spent in the linear solve (including any fallback).
    pub solve_us: u64,
    /// Wall-clock time of the whole solve.
    pub total_us: u64,
    /// Conjugate gradient iterations performed.
    pub iterations: usize,
    /// Relative residual of the accepted solution.
    pub residual: f64,
    /// Method whose result was accepted.
    pub method: SolveMethod,
    /// `true` when conjugate gradient failed and the direct solve was used.
    pub fell_back: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = SolveMetrics::default();
        assert_eq!(m.unknowns, 0);
        assert_eq!(m.nnz, 0);
        assert_eq!(m.total_us, 0);
        assert_eq!(m.iterations, 0);
        assert_eq!(m.residual, 0.0);
        assert_eq!(m.method, SolveMethod::ConjugateGradient);
        assert!(!m.fell_back);
    }
}
