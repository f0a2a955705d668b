//! # Number Property Benchmarks
//!
//! Cost of the individual property checks and the combined classification
//! across input magnitudes, up to the top of the accepted range.

use classify_number::numbers::{
    digit_sum, is_armstrong, is_perfect, is_prime, NumberClassification,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const INPUTS: &[u64] = &[
    371,
    8_128,
    1_000_000_007,
    33_550_336,
    999_999_999_989,
    9_223_372_036_854_775_783,
];

fn bench_property_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("property_checks");

    for &n in INPUTS {
        group.bench_with_input(BenchmarkId::new("is_prime", n), &n, |b, &n| {
            b.iter(|| is_prime(black_box(n)));
        });
        group.bench_with_input(BenchmarkId::new("is_perfect", n), &n, |b, &n| {
            b.iter(|| is_perfect(black_box(n)));
        });
        group.bench_with_input(BenchmarkId::new("is_armstrong", n), &n, |b, &n| {
            b.iter(|| is_armstrong(black_box(n)));
        });
        group.bench_with_input(BenchmarkId::new("digit_sum", n), &n, |b, &n| {
            b.iter(|| digit_sum(black_box(n)));
        });
    }

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for &n in INPUTS {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| NumberClassification::classify(black_box(n)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_property_checks, bench_classification);
criterion_main!(benches);
