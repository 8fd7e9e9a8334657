//! End-to-end solve benchmarks on the reference problems.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use heatfill_bench::{bench_config, reference_problem, volume_problem};
use heatfill_core::SolveMethod;
use heatfill_engine::{DiffusionSolver, Problem, SolveConfig};

/// Benchmark: full solve of the 10K-cell reference grid at 1 and 4 workers.
fn bench_reference_solve(c: &mut Criterion) {
    let problem = reference_problem(42);
    let mut group = c.benchmark_group("reference_solve");
    for workers in [1usize, 4] {
        let solver = DiffusionSolver::new(bench_config(1, workers)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                let out = solver
                    .solve(&Problem::new(problem.grid.view(), problem.fixed.view()))
                    .unwrap();
                black_box(out.grid);
            });
        });
    }
    group.finish();
}

/// Benchmark: direct-only solve of the same grid.
fn bench_reference_direct(c: &mut Criterion) {
    let problem = reference_problem(42);
    let solver = DiffusionSolver::new(SolveConfig {
        method: SolveMethod::Direct,
        ..bench_config(1, 4)
    })
    .unwrap();
    c.bench_function("reference_direct", |b| {
        b.iter(|| {
            let out = solver
                .solve(&Problem::new(problem.grid.view(), problem.fixed.view()))
                .unwrap();
            black_box(out.grid);
        });
    });
}

/// Benchmark: 3-D grid with the 26-neighbour stencil.
fn bench_volume_solve(c: &mut Criterion) {
    let problem = volume_problem(42);
    let solver = DiffusionSolver::new(bench_config(3, 4)).unwrap();
    c.bench_function("volume_solve_r3", |b| {
        b.iter(|| {
            let out = solver
                .solve(&Problem::new(problem.grid.view(), problem.fixed.view()))
                .unwrap();
            black_box(out.grid);
        });
    });
}

criterion_group!(
    benches,
    bench_reference_solve,
    bench_reference_direct,
    bench_volume_solve
);
criterion_main!(benches);
