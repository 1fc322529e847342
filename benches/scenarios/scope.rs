//! Benchmarks for the measure scope, both sides of the lock.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use envgen::scope::{ScopeBuffer, ScopeDataSink, ScopeReader};
use envgen::{TransportSnapshot, MAX_LANES};

use crate::BLOCK_SIZES;

const SR: f64 = 48_000.0;

/// Display widths in columns (terminal cells × 2 for braille)
const WIDTHS: &[usize] = &[160, 320, 640];

fn filled_scope() -> Arc<ScopeBuffer> {
    let scope = Arc::new(ScopeBuffer::with_lanes(MAX_LANES, SR).unwrap());
    scope.update_transport(&TransportSnapshot::playing(0.0, 120.0));

    // One full 4/4 bar at 120 BPM
    let audio: Vec<f32> = (0..96_000).map(|i| ((i as f32) * 0.01).sin()).collect();
    let envelope: Vec<f32> = (0..96_000).map(|i| (i % 6_000) as f32 / 6_000.0).collect();
    scope.push_audio(&audio);
    for lane in 0..MAX_LANES {
        scope.push_envelope(&envelope, lane);
    }
    scope
}

pub fn bench_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/scope");

    // Audio-thread side: one block of audio and eight envelope lanes
    for &size in BLOCK_SIZES {
        let scope = ScopeBuffer::with_lanes(MAX_LANES, SR).unwrap();
        let audio = vec![0.25f32; size];
        let envelope = vec![0.5f32; size];
        let transport = TransportSnapshot::playing(0.0, 120.0);
        group.bench_with_input(BenchmarkId::new("push_block", size), &size, |b, _| {
            b.iter(|| {
                scope.update_transport(black_box(&transport));
                scope.push_audio(black_box(&audio));
                for lane in 0..MAX_LANES {
                    scope.push_envelope(black_box(&envelope), lane);
                }
            })
        });
    }

    // UI side: copy out and downsample one frame
    for &width in WIDTHS {
        let mut reader = ScopeReader::new(filled_scope());
        group.bench_with_input(BenchmarkId::new("refresh", width), &width, |b, &width| {
            b.iter(|| {
                black_box(reader.refresh(width));
            })
        });
    }

    group.finish();
}
