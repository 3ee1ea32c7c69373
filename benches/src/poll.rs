use std::hint::black_box;

use anc350::prelude::*;
use anc350_benches::open_emulator;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const TEST_DISTANCES: &[usize] = &[1, 10, 100];

fn approach(c: &mut Criterion) {
    let mut group = c.benchmark_group("anc350/poll/approach");

    TEST_DISTANCES.iter().for_each(|&distance| {
        group.bench_with_input(
            BenchmarkId::new("single", distance),
            &distance,
            |b, &distance| {
                let mut anc = open_emulator(distance);
                let mut forward = true;
                b.iter(|| {
                    let target = if forward { distance as f64 } else { 0. };
                    forward = !forward;
                    let mut session = anc
                        .move_axis(Axis::X, Move::Absolute(Position::Metric(target)))
                        .unwrap();
                    anc.wait(black_box(&mut session)).unwrap();
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("sync", distance),
            &distance,
            |b, &distance| {
                let mut anc = open_emulator(distance);
                let mut forward = true;
                b.iter(|| {
                    let target = Position::Metric(if forward { distance as f64 } else { 0. });
                    forward = !forward;
                    let mut session = anc
                        .move_sync(&[(Axis::X, target), (Axis::Y, target), (Axis::Z, target)])
                        .unwrap();
                    anc.wait(black_box(&mut session)).unwrap();
                })
            },
        );
    });
    group.finish();
}

criterion_group!(benches, approach);
criterion_main!(benches);
