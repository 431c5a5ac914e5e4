//! Benchmark for the full Pearson correlation matrix and histogram binning
//!
//! Run with: cargo bench --bench correlation_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use vinoveritas::pipeline::{correlation_from_columns, density_curve, Histogram, FEATURE_BINS};

/// Synthetic columns cycling through a few shapes, with ~1% nulls
fn generate_columns(n_rows: usize, n_features: usize, seed: u64) -> (Vec<String>, Vec<Vec<Option<f64>>>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(n_features);

    for i in 0..n_features {
        let values: Vec<Option<f64>> = match i % 3 {
            0 => (0..n_rows).map(|_| Some(rng.gen::<f64>() * 15.0)).collect(),
            1 => (0..n_rows)
                .map(|_| {
                    let v = rng.gen::<f64>();
                    Some(v * v * v * 100.0)
                })
                .collect(),
            _ => {
                // Tied to the previous column, like pH to fixed acidity
                let base = &columns[i - 1];
                base.iter()
                    .map(|v| v.map(|x| 4.0 - 0.1 * x + rng.gen::<f64>() * 0.05))
                    .collect()
            }
        };
        let values = values
            .into_iter()
            .map(|v| if rng.gen::<f64>() < 0.01 { None } else { v })
            .collect();
        columns.push(values);
    }

    let names = (0..n_features).map(|i| format!("feature_{}", i)).collect();
    (names, columns)
}

fn benchmark_correlation_by_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation_by_columns");
    group.sample_size(30);

    let n_rows = 1_600;
    for n_cols in [6, 12, 24, 48] {
        let (names, columns) = generate_columns(n_rows, n_cols, 42);
        let pairs = n_cols * (n_cols - 1) / 2;
        group.throughput(Throughput::Elements(pairs as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_cols), &n_cols, |b, _| {
            b.iter(|| correlation_from_columns(black_box(names.clone()), black_box(&columns)))
        });
    }

    group.finish();
}

fn benchmark_correlation_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation_by_rows");
    group.sample_size(20);

    let n_cols = 12;
    for n_rows in [1_600, 16_000, 160_000] {
        let (names, columns) = generate_columns(n_rows, n_cols, 7);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &n_rows, |b, _| {
            b.iter(|| correlation_from_columns(black_box(names.clone()), black_box(&columns)))
        });
    }

    group.finish();
}

fn benchmark_histogram_with_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram_with_density");

    for n_rows in [1_600, 16_000] {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 15.0).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &values, |b, values| {
            b.iter(|| {
                let histogram = Histogram::from_values(black_box(values), FEATURE_BINS);
                histogram.map(|h| density_curve(values, &h))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_correlation_by_columns,
    benchmark_correlation_by_rows,
    benchmark_histogram_with_density
);
criterion_main!(benches);
