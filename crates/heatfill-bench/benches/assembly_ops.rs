//! Criterion micro-benchmarks for index mapping, stencils and assembly.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use heatfill_bench::stress_problem;
use heatfill_engine::assemble::{assemble, AssemblyContext};
use heatfill_engine::WorkerPool;
use heatfill_space::{Stencil, UnknownIndexMap};

/// Benchmark: build the unknown index map of a ~100K-cell grid.
fn bench_index_map(c: &mut Criterion) {
    let problem = stress_problem(42);
    c.bench_function("index_map_100k", |b| {
        b.iter(|| black_box(UnknownIndexMap::build(problem.fixed.view()).unwrap()));
    });
}

/// Benchmark: generate stencils of growing radius in 3-D.
fn bench_stencil(c: &mut Criterion) {
    let mut group = c.benchmark_group("stencil_3d");
    for radius in [1u32, 3, 9] {
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &r| {
            b.iter(|| black_box(Stencil::new(3, r).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: assemble the ~100K-cell system at several pool sizes.
fn bench_assembly(c: &mut Criterion) {
    let problem = stress_problem(42);
    let map = UnknownIndexMap::build(problem.fixed.view()).unwrap();
    let ctx = Arc::new(AssemblyContext::new(map, problem.grid.view(), None).unwrap());
    let stencil = Stencil::new(2, 2).unwrap();

    let mut group = c.benchmark_group("assemble_100k_r2");
    for workers in [1usize, 2, 4, 8] {
        let pool = WorkerPool::new(workers).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| black_box(assemble(&ctx, &stencil, &pool).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_index_map, bench_stencil, bench_assembly);
criterion_main!(benches);
