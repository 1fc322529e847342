//! Benchmarks for modulation mixing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use envgen::dsp::modulate::{base_gain, Destination, ModulationMixer};
use envgen::MAX_LANES;

use crate::BLOCK_SIZES;

pub fn bench_modulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/modulate");

    let routes: Vec<(Destination, f32)> = (0..MAX_LANES)
        .map(|i| {
            let destination = if i % 2 == 0 {
                Destination::Volume
            } else {
                Destination::Cutoff
            };
            (destination, if i % 3 == 0 { -0.5 } else { 0.75 })
        })
        .collect();

    for &size in BLOCK_SIZES {
        let envelopes: Vec<f32> = (0..size).map(|i| i as f32 / size as f32).collect();
        let mut gains = vec![0.0f32; size];
        let mut cutoffs = vec![0.0f32; size];
        let mut mixer = ModulationMixer::new();

        group.bench_with_input(BenchmarkId::new("8_lanes", size), &size, |b, _| {
            b.iter(|| {
                for i in 0..size {
                    mixer.clear();
                    for &(destination, amount) in &routes {
                        mixer.add(destination, black_box(envelopes[i]), amount);
                    }
                    gains[i] = mixer.gain(base_gain(false));
                    cutoffs[i] = mixer.cutoff(1_000.0);
                }
                black_box((&gains, &cutoffs));
            })
        });
    }

    group.finish();
}
