//! Criterion micro-benchmarks for row-partitioned products and CG.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use heatfill_bench::stress_problem;
use heatfill_engine::assemble::{assemble, AssemblyContext};
use heatfill_engine::{RowPartitionedMatrix, WorkerPool};
use heatfill_space::{Stencil, UnknownIndexMap};
use heatfill_sparse::{conjugate_gradient, spmv, CgOptions, CpuBackend, SparseSystem};

fn stress_system() -> Arc<SparseSystem> {
    let problem = stress_problem(42);
    let map = UnknownIndexMap::build(problem.fixed.view()).unwrap();
    let ctx = Arc::new(AssemblyContext::new(map, problem.grid.view(), None).unwrap());
    let stencil = Stencil::new(2, 1).unwrap();
    let pool = WorkerPool::new(4).unwrap();
    Arc::new(assemble(&ctx, &stencil, &pool).unwrap())
}

/// Benchmark: single CSR product as the baseline.
fn bench_plain_spmv(c: &mut Criterion) {
    let system = stress_system();
    let csr = system.to_csr();
    let x = vec![1.0; system.size()];
    c.bench_function("spmv_csr_100k", |b| {
        b.iter(|| black_box(spmv(csr.view(), &x)));
    });
}

/// Benchmark: partitioned product at several block counts on 4 workers.
fn bench_partitioned_matvec(c: &mut Criterion) {
    let system = stress_system();
    let x = vec![1.0; system.size()];
    let pool = Arc::new(WorkerPool::new(4).unwrap());

    let mut group = c.benchmark_group("partitioned_matvec_100k");
    for blocks in [1usize, 4, 16] {
        let matrix = RowPartitionedMatrix::new(
            Arc::clone(&system),
            blocks,
            Arc::clone(&pool),
            Arc::new(CpuBackend),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &blocks, |b, _| {
            b.iter(|| black_box(matrix.matvec(&x).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: conjugate gradient through the partitioned operator.
fn bench_cg(c: &mut Criterion) {
    let system = stress_system();
    let pool = Arc::new(WorkerPool::new(4).unwrap());
    let matrix =
        RowPartitionedMatrix::new(Arc::clone(&system), 4, pool, Arc::new(CpuBackend)).unwrap();
    let options = CgOptions::default();
    c.bench_function("cg_100k", |b| {
        b.iter(|| {
            black_box(conjugate_gradient(&matrix, system.rhs(), &options, &CpuBackend).unwrap())
        });
    });
}

criterion_group!(benches, bench_plain_spmv, bench_partitioned_matvec, bench_cg);
criterion_main!(benches);
