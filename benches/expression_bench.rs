//! Benchmarks for cgp-expression.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use cgp_expression::{Expression, Kernel, KernelSet};

fn kernels() -> Vec<Kernel<f64>> {
    KernelSet::from_names(&["sum", "diff", "mul", "pdiv"])
        .unwrap()
        .build()
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("expression_construct_2x100", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(Expression::new(3, 1, 2, 100, 50, 2, kernels(), seed).unwrap());
        });
    });
}

fn bench_mutation(c: &mut Criterion) {
    let mut expr = Expression::new(3, 1, 2, 100, 50, 2, kernels(), 42).unwrap();

    c.bench_function("mutate_active_single", |b| {
        b.iter(|| {
            expr.mutate_active(1);
            black_box(expr.chromosome());
        });
    });

    let mut expr = Expression::new(3, 1, 2, 100, 50, 2, kernels(), 42).unwrap();
    c.bench_function("mutate_random_ten", |b| {
        b.iter(|| {
            expr.mutate_random(10);
            black_box(expr.chromosome());
        });
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let expr = Expression::new(3, 1, 2, 100, 50, 2, kernels(), 42).unwrap();
    let point = [0.5, -1.25, 3.0];

    c.bench_function("evaluate_single_point", |b| {
        b.iter(|| {
            black_box(expr.evaluate(black_box(&point)).unwrap());
        });
    });

    c.bench_function("evaluate_symbolic", |b| {
        let names = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        b.iter(|| {
            black_box(expr.evaluate_symbolic(black_box(&names)).unwrap());
        });
    });
}

fn bench_batch_loss(c: &mut Criterion) {
    let expr = Expression::new(3, 1, 2, 50, 25, 2, kernels(), 42).unwrap();
    let points: Vec<Vec<f64>> = (0..512)
        .map(|i| {
            let t = f64::from(i) * 0.01;
            vec![t, t * t, 1.0 - t]
        })
        .collect();
    let labels: Vec<Vec<f64>> = points.iter().map(|p| vec![p[0] + p[1]]).collect();

    c.bench_function("batch_loss_sequential_512", |b| {
        b.iter(|| {
            black_box(expr.batch_loss(&points, &labels, "MSE", 0).unwrap());
        });
    });

    c.bench_function("batch_loss_parallel_8x64", |b| {
        b.iter(|| {
            black_box(expr.batch_loss(&points, &labels, "MSE", 8).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_construction,
    bench_mutation,
    bench_evaluation,
    bench_batch_loss,
);
criterion_main!(benches);
