use std::hint::black_box;

use anc350_core::{
    bitmask,
    status::{ExtendedStatus, LegacyStatus, StatusFlags},
};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const TEST_WIDTHS: &[usize] = &[4, 7, 32, 64];

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("anc350/bitmask/encode");

    TEST_WIDTHS.iter().for_each(|&width| {
        group.bench_with_input(
            BenchmarkId::new("flags", width),
            &(0..width).map(|i| i % 3 == 0).collect::<Vec<_>>(),
            |b, flags| {
                b.iter(|| bitmask::encode(black_box(flags.iter().copied())));
            },
        );
    });
    group.finish();
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("anc350/bitmask/decode");

    TEST_WIDTHS.iter().for_each(|&width| {
        group.bench_with_input(BenchmarkId::new("inferred", width), &width, |b, &width| {
            let value = 1u64 << (width - 1);
            b.iter(|| bitmask::decode(black_box(value), None));
        });
        group.bench_with_input(BenchmarkId::new("fixed", width), &width, |b, &width| {
            b.iter(|| bitmask::decode(black_box(1u64), Some(width)));
        });
    });
    group.finish();
}

fn status(c: &mut Criterion) {
    let mut group = c.benchmark_group("anc350/bitmask/status");

    group.bench_function("legacy", |b| {
        b.iter(|| LegacyStatus::decode(black_box(0b0101u64)));
    });
    group.bench_function("extended", |b| {
        b.iter(|| ExtendedStatus::decode(black_box(0b100_0111u64)));
    });
    group.finish();
}

criterion_group!(benches, encode, decode, status);
criterion_main!(benches);
