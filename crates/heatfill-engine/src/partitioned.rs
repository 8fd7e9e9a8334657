//! Row-partitioned sparse matrix with pool-parallel products.
//!
//! The rows `0..K` are split into `P` contiguous blocks; the first
//! `K mod P` blocks get one extra row. Each block is an independent CSR
//! matrix of shape `(rows_in_block, K)` holding exactly the triples whose
//! row falls inside it, in their assembly order. A product
//! computes every block on the pool and concatenates the partial results
//! in block order.
//!
//! Every output entry is accumulated from the same row contents in the
//! same order whatever `P` is, so products are bit-identical across
//! block counts.

use std::ops::Range;
use std::sync::Arc;

use heatfill_core::LinalgError;
use heatfill_sparse::{Backend, LinearOperator, SparseSystem};
use sprs::{CsMat, TriMat};

use crate::error::SolveError;
use crate::pool::WorkerPool;

/// Split `0..rows` into `blocks` contiguous ranges, the first
/// `rows % blocks` of them one row longer. `blocks` is clamped to
/// `[1, rows]`; zero rows yield no ranges.
pub fn block_ranges(rows: usize, blocks: usize) -> Vec<Range<usize>> {
    if rows == 0 {
        return Vec::new();
    }
    let blocks = blocks.clamp(1, rows);
    let base = rows / blocks;
    let extra = rows % blocks;
    let mut ranges = Vec::with_capacity(blocks);
    let mut start = 0;
    for b in 0..blocks {
        let len = base + usize::from(b < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

#[derive(Debug)]
struct RowBlock {
    rows: Range<usize>,
    matrix: Arc<CsMat<f64>>,
}

/// A square sparse matrix split into row blocks for parallel products.
pub struct RowPartitionedMatrix {
    size: usize,
    nnz: usize,
    blocks: Vec<RowBlock>,
    diagonal: Vec<f64>,
    pool: Arc<WorkerPool>,
    backend: Arc<dyn Backend>,
}

impl RowPartitionedMatrix {
    /// Partition `system`'s matrix into `block_count` row blocks, building
    /// each block's CSR form on `pool`.
    pub fn new(
        system: Arc<SparseSystem>,
        block_count: usize,
        pool: Arc<WorkerPool>,
        backend: Arc<dyn Backend>,
    ) -> Result<Self, SolveError> {
        let size = system.size();
        let ranges = block_ranges(size, block_count);

        let mut handles = Vec::with_capacity(ranges.len());
        for range in &ranges {
            let system = Arc::clone(&system);
            let range = range.clone();
            handles.push(pool.submit(move || build_block(&system, range))?);
        }
        let mut blocks = Vec::with_capacity(ranges.len());
        for (handle, rows) in handles.into_iter().zip(ranges) {
            blocks.push(RowBlock {
                rows,
                matrix: Arc::new(handle.wait()?),
            });
        }

        Ok(Self {
            size,
            nnz: blocks.iter().map(|b| b.matrix.nnz()).sum(),
            blocks,
            diagonal: system.diagonal(),
            pool,
            backend,
        })
    }

    /// `(K, K)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.size, self.size)
    }

    /// Number of row blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Row range of every block, in order.
    pub fn block_ranges(&self) -> Vec<Range<usize>> {
        self.blocks.iter().map(|b| b.rows.clone()).collect()
    }

    /// Stored entries after duplicate summation.
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Diagonal entries `A[i][i]`.
    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    /// Compute `A x` with one pool task per block, each running
    /// [`Backend::spmv`] on its block.
    pub fn matvec(&self, x: &[f64]) -> Result<Vec<f64>, LinalgError> {
        if x.len() != self.size {
            return Err(LinalgError::DimensionMismatch {
                expected: self.size,
                actual: x.len(),
            });
        }
        let x: Arc<[f64]> = Arc::from(x);
        let mut handles = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let matrix = Arc::clone(&block.matrix);
            let x = Arc::clone(&x);
            let backend = Arc::clone(&self.backend);
            let handle = self
                .pool
                .submit(move || backend.spmv(matrix.view(), &x))
                .map_err(operator_failed)?;
            handles.push(handle);
        }
        let mut parts = Vec::with_capacity(handles.len());
        for handle in handles {
            parts.push(handle.wait().map_err(operator_failed)?);
        }
        Ok(self.backend.concat(parts))
    }

    /// Release this matrix's pool handle. When it was the last handle the
    /// pool is shut down here and the number of joined workers returned.
    pub fn close(self) -> Option<usize> {
        Arc::try_unwrap(self.pool).ok().map(|mut pool| pool.shutdown())
    }
}

impl std::fmt::Debug for RowPartitionedMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowPartitionedMatrix")
            .field("size", &self.size)
            .field("nnz", &self.nnz)
            .field("blocks", &self.blocks.len())
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl LinearOperator for RowPartitionedMatrix {
    fn size(&self) -> usize {
        self.size
    }

    fn apply(&self, x: &[f64]) -> Result<Vec<f64>, LinalgError> {
        self.matvec(x)
    }

    fn diagonal(&self) -> Vec<f64> {
        self.diagonal.clone()
    }
}

fn build_block(system: &SparseSystem, rows: Range<usize>) -> CsMat<f64> {
    let mut tri = TriMat::new((rows.len(), system.size()));
    for ((&r, &c), &v) in system.rows().iter().zip(system.cols()).zip(system.values()) {
        let r = r as usize;
        if rows.contains(&r) {
            tri.add_triplet(r - rows.start, c as usize, v);
        }
    }
    tri.to_csr()
}

fn operator_failed(e: crate::pool::PoolError) -> LinalgError {
    LinalgError::OperatorFailed {
        reason: e.to_string(),
    }
}
