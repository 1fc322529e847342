//! Benchmarks for the AHD envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use envgen::dsp::envelope::{Envelope, DEFAULT_SMOOTHING_TIME};

use crate::BLOCK_SIZES;

const SR: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up), raw output
        let mut env = Envelope::ahd(SR, 5.0, 0.0, 5.0).with_smoothing(None);
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack_raw", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Attack phase with one-pole smoothing
        let mut env = Envelope::ahd(SR, 5.0, 0.0, 5.0).with_smoothing(Some(DEFAULT_SMOOTHING_TIME));
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack_smoothed", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Decay phase (ramping down)
        let mut env = Envelope::ahd(SR, 0.001, 0.0, 10.0);
        env.trigger();
        for _ in 0..100 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Retriggered every block, the sequencer's worst case
        let mut env = Envelope::ahd(SR, 0.001, 0.01, 0.05);
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                env.trigger();
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
