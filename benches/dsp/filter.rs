//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use envgen::dsp::filter::SVFilter;
use envgen::dsp::modulate::modulated_cutoff;

use crate::BLOCK_SIZES;

const SR: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Lowpass filter
        let mut filter = SVFilter::lowpass(1000.0, SR);
        filter.set_resonance(0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), 0);
            })
        });

        // Highpass filter
        let mut filter = SVFilter::highpass(1000.0, SR);
        filter.set_resonance(0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("highpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), 0);
            })
        });

        // Bandpass filter
        let mut filter = SVFilter::bandpass(1000.0, SR);
        filter.set_resonance(0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("bandpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), 0);
            })
        });

        // Cutoff moved every sample, as under envelope modulation
        let mut filter = SVFilter::lowpass(1000.0, SR);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("modulated_cutoff", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let sum = i as f32 / size as f32;
                    filter.set_cutoff(modulated_cutoff(500.0, sum));
                    *sample = filter.process_sample(*sample, 0);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
