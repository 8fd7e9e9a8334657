//! Triple-form sparse systems and sparse matrix-vector products.

use heatfill_core::LinalgError;
use sprs::prod::{mul_acc_mat_vec_csc, mul_acc_mat_vec_csr};
use sprs::{CsMat, CsMatView, TriMat};

/// A square linear system `A x = b` held as coordinate triples.
///
/// Duplicate `(row, col)` entries are summed when the matrix is
/// compressed. Triple order is preserved exactly as assembled, which
/// keeps every downstream reduction deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseSystem {
    size: usize,
    rows: Vec<u32>,
    cols: Vec<u32>,
    values: Vec<f64>,
    rhs: Vec<f64>,
}

impl SparseSystem {
    /// Build a system of dimension `size` from parallel triple vectors and
    /// a right-hand side.
    ///
    /// Fails with [`LinalgError::DimensionMismatch`] when the triple
    /// vectors disagree in length, `rhs.len() != size`, or an index
    /// falls outside `0..size`.
    pub fn new(
        size: usize,
        rows: Vec<u32>,
        cols: Vec<u32>,
        values: Vec<f64>,
        rhs: Vec<f64>,
    ) -> Result<Self, LinalgError> {
        if cols.len() != rows.len() {
            return Err(LinalgError::DimensionMismatch {
                expected: rows.len(),
                actual: cols.len(),
            });
        }
        if values.len() != rows.len() {
            return Err(LinalgError::DimensionMismatch {
                expected: rows.len(),
                actual: values.len(),
            });
        }
        if rhs.len() != size {
            return Err(LinalgError::DimensionMismatch {
                expected: size,
                actual: rhs.len(),
            });
        }
        if let Some(&bad) = rows.iter().chain(&cols).find(|&&i| i as usize >= size) {
            return Err(LinalgError::DimensionMismatch {
                expected: size,
                actual: bad as usize + 1,
            });
        }
        Ok(Self {
            size,
            rows,
            cols,
            values,
            rhs,
        })
    }

    /// Matrix dimension `K`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored triples (duplicates counted separately).
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Row index of every triple.
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    /// Column index of every triple.
    pub fn cols(&self) -> &[u32] {
        &self.cols
    }

    /// Value of every triple.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Right-hand side `b`.
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Bytes held by the triples and the right-hand side.
    pub fn memory_bytes(&self) -> usize {
        self.rows.len() * std::mem::size_of::<u32>()
            + self.cols.len() * std::mem::size_of::<u32>()
            + self.values.len() * std::mem::size_of::<f64>()
            + self.rhs.len() * std::mem::size_of::<f64>()
    }

    /// Summed diagonal entries `A[i][i]`.
    pub fn diagonal(&self) -> Vec<f64> {
        let mut diag = vec![0.0; self.size];
        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            if r == c {
                diag[r as usize] += v;
            }
        }
        diag
    }

    fn triplets(&self) -> TriMat<f64> {
        let mut tri = TriMat::with_capacity((self.size, self.size), self.nnz());
        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            tri.add_triplet(r as usize, c as usize, v);
        }
        tri
    }

    /// Compress to CSR, summing duplicates.
    pub fn to_csr(&self) -> CsMat<f64> {
        self.triplets().to_csr()
    }

    /// Compress to CSC, summing duplicates.
    pub fn to_csc(&self) -> CsMat<f64> {
        self.triplets().to_csc()
    }

    /// Relative residual `‖b − A x‖ / ‖b‖` of a candidate solution
    /// (absolute residual when `b = 0`).
    pub fn relative_residual(&self, x: &[f64]) -> Result<f64, LinalgError> {
        if x.len() != self.size {
            return Err(LinalgError::DimensionMismatch {
                expected: self.size,
                actual: x.len(),
            });
        }
        let mut ax = vec![0.0; self.size];
        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            ax[r as usize] += v * x[c as usize];
        }
        let residual = ax
            .iter()
            .zip(&self.rhs)
            .map(|(a, b)| (b - a) * (b - a))
            .sum::<f64>()
            .sqrt();
        let b_norm = self.rhs.iter().map(|b| b * b).sum::<f64>().sqrt();
        Ok(if b_norm > 0.0 {
            residual / b_norm
        } else {
            residual
        })
    }

    /// Accept `x` only if it is finite and within `tolerance` relative
    /// residual; returns the residual on success.
    pub fn verify_solution(&self, x: &[f64], tolerance: f64) -> Result<f64, LinalgError> {
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(LinalgError::NonFinite { index });
        }
        let residual = self.relative_residual(x)?;
        if residual.is_nan() || residual > tolerance {
            return Err(LinalgError::ResidualTooLarge {
                residual,
                tolerance,
            });
        }
        Ok(residual)
    }
}

/// Sparse matrix-vector product `y = M x` for CSR or CSC storage.
///
/// CSR rows are accumulated left to right over their stored columns by
/// `sprs`, so each output entry depends only on its row's contents.
///
/// # Panics
///
/// Panics if `x.len() != m.cols()`.
pub fn spmv(m: CsMatView<'_, f64>, x: &[f64]) -> Vec<f64> {
    assert_eq!(x.len(), m.cols(), "spmv: length mismatch");
    let mut y = vec![0.0; m.rows()];
    if m.is_csr() {
        mul_acc_mat_vec_csr(m, x, &mut y[..]);
    } else {
        mul_acc_mat_vec_csc(m, x, &mut y[..]);
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiagonal(n: usize) -> SparseSystem {
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut values = Vec::new();
        for i in 0..n as u32 {
            if i > 0 {
                rows.push(i);
                cols.push(i - 1);
                values.push(-1.0);
            }
            if (i as usize) + 1 < n {
                rows.push(i);
                cols.push(i + 1);
                values.push(-1.0);
            }
        }
        for i in 0..n as u32 {
            rows.push(i);
            cols.push(i);
            values.push(2.0);
        }
        SparseSystem::new(n, rows, cols, values, vec![1.0; n]).unwrap()
    }

    #[test]
    fn rejects_ragged_triples() {
        let err = SparseSystem::new(2, vec![0, 1], vec![0], vec![1.0, 1.0], vec![0.0; 2]);
        assert_eq!(
            err,
            Err(LinalgError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = SparseSystem::new(2, vec![0, 2], vec![0, 0], vec![1.0, 1.0], vec![0.0; 2]);
        assert!(matches!(err, Err(LinalgError::DimensionMismatch { .. })));
    }

    #[test]
    fn duplicates_are_summed() {
        let sys =
            SparseSystem::new(2, vec![0, 0, 1], vec![0, 0, 1], vec![1.5, 2.5, 3.0], vec![0.0; 2])
                .unwrap();
        let csr = sys.to_csr();
        assert_eq!(csr.nnz(), 2);
        assert_eq!(spmv(csr.view(), &[1.0, 1.0]), vec![4.0, 3.0]);
        assert_eq!(sys.diagonal(), vec![4.0, 3.0]);
    }

    #[test]
    fn csr_and_csc_products_agree() {
        let sys = tridiagonal(6);
        let x: Vec<f64> = (0..6).map(|i| i as f64 * 0.5 - 1.0).collect();
        let a = spmv(sys.to_csr().view(), &x);
        let b = spmv(sys.to_csc().view(), &x);
        for (p, q) in a.iter().zip(&b) {
            assert!((p - q).abs() < 1e-14);
        }
    }

    #[test]
    fn csr_product_sums_each_row_in_stored_order() {
        let sys = tridiagonal(5);
        let csr = sys.to_csr();
        let x = [0.1, 0.7, -0.3, 1e-9, 5.0];
        let mut expected = vec![0.0; 5];
        for (row, lane) in csr.outer_iterator().enumerate() {
            for (col, &v) in lane.iter() {
                expected[row] += v * x[col];
            }
        }
        assert_eq!(spmv(csr.view(), &x), expected);
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn product_rejects_wrong_length() {
        spmv(tridiagonal(3).to_csr().view(), &[1.0; 2]);
    }

    #[test]
    fn memory_accounts_for_every_vector() {
        let sys = tridiagonal(4);
        // 10 triples at 4 + 4 + 8 bytes, 4 rhs entries at 8 bytes
        assert_eq!(sys.nnz(), 10);
        assert_eq!(sys.memory_bytes(), 10 * 16 + 4 * 8);
    }

    #[test]
    fn verify_solution_rejects_bad_candidates() {
        let sys = tridiagonal(3);
        // exact solution of [2 -1 0; -1 2 -1; 0 -1 2] x = 1
        let exact = [1.5, 2.0, 1.5];
        assert!(sys.verify_solution(&exact, 1e-12).unwrap() < 1e-12);
        assert!(matches!(
            sys.verify_solution(&[0.0, 0.0, 0.0], 1e-6),
            Err(LinalgError::ResidualTooLarge { .. })
        ));
        assert_eq!(
            sys.verify_solution(&[1.0, f64::NAN, 1.0], 1e-6),
            Err(LinalgError::NonFinite { index: 1 })
        );
    }
}
