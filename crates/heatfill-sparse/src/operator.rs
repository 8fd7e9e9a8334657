//! The matrix abstraction consumed by iterative solvers.

use heatfill_core::LinalgError;
use sprs::CsMat;

use crate::system::spmv;

/// A square matrix known only through its action on vectors.
///
/// The iterative solver never inspects storage; it only needs products
/// and the diagonal (for singular-row detection and Jacobi scaling).
pub trait LinearOperator {
    /// Matrix dimension.
    fn size(&self) -> usize;

    /// Compute `A x`.
    ///
    /// Implementations backed by worker threads report task failures
    /// as [`LinalgError::OperatorFailed`].
    fn apply(&self, x: &[f64]) -> Result<Vec<f64>, LinalgError>;

    /// Diagonal entries `A[i][i]`.
    fn diagonal(&self) -> Vec<f64>;
}

impl LinearOperator for CsMat<f64> {
    fn size(&self) -> usize {
        self.rows()
    }

    fn apply(&self, x: &[f64]) -> Result<Vec<f64>, LinalgError> {
        if x.len() != self.cols() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.cols(),
                actual: x.len(),
            });
        }
        Ok(spmv(self.view(), x))
    }

    fn diagonal(&self) -> Vec<f64> {
        let mut diag = vec![0.0; self.rows().min(self.cols())];
        for (outer, lane) in self.outer_iterator().enumerate() {
            for (inner, &v) in lane.iter() {
                if inner == outer && inner < diag.len() {
                    diag[inner] += v;
                }
            }
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    #[test]
    fn csr_operator_reports_diagonal_and_product() {
        let mut tri = TriMat::new((2, 2));
        tri.add_triplet(0, 0, 3.0);
        tri.add_triplet(0, 1, -1.0);
        tri.add_triplet(1, 0, -1.0);
        tri.add_triplet(1, 1, 2.0);
        let m: CsMat<f64> = tri.to_csr();
        assert_eq!(LinearOperator::diagonal(&m), vec![3.0, 2.0]);
        assert_eq!(LinearOperator::apply(&m, &[1.0, 1.0]).unwrap(), vec![2.0, 1.0]);
        assert_eq!(
            LinearOperator::apply(&m, &[1.0]),
            Err(LinalgError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
