//! Solve-strategy selectors shared by configuration, metrics and events.

use std::fmt;

/// Which linear-solve strategy a solve uses (or used).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SolveMethod {
    /// Conjugate gradient with a direct fallback on non-convergence.
    #[default]
    ConjugateGradient,
    /// Direct sparse LDLᵀ factorization only.
    Direct,
}

impl SolveMethod {
    /// Short stable name, used in log lines and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConjugateGradient => "cg",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preconditioner applied inside the conjugate gradient iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Preconditioner {
    /// Plain (unpreconditioned) conjugate gradient.
    #[default]
    None,
    /// Diagonal scaling: `z = diag(A)⁻¹ ⊙ r`.
    Jacobi,
}

/// Why the iterative solver gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NonConvergence {
    /// The iteration cap was reached above tolerance.
    IterationLimit,
    /// A search direction lost positive curvature or went non-finite.
    Breakdown,
    /// The matrix has a row with a non-positive diagonal.
    SingularRow,
}

impl fmt::Display for NonConvergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterationLimit => write!(f, "iteration limit reached"),
            Self::Breakdown => write!(f, "numerical breakdown"),
            Self::SingularRow => write!(f, "singular row"),
        }
    }
}
