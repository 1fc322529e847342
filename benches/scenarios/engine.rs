//! Benchmarks for full engine blocks.
//!
//! These represent what the audio callback actually pays per host block:
//! parameter read, sequencing, per-sample envelopes and filter, and the
//! scope feed.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use envgen::dsp::modulate::Destination;
use envgen::sequencing::StepRate;
use envgen::{
    EngineConfig, EngineParams, EnvGenEngine, LaneConfig, ScopeBuffer, TransportSnapshot, MAX_LANES,
};

use crate::BLOCK_SIZES;

const SR: f64 = 48_000.0;

fn busy_params() -> EngineParams {
    let mut params = EngineParams::default();
    for i in 0..MAX_LANES {
        let destination = if i % 2 == 0 {
            Destination::Volume
        } else {
            Destination::Cutoff
        };
        let mut lane = LaneConfig::default()
            .with_rate(StepRate::Sixteenth)
            .with_ahd(0.002, 0.02, 0.1)
            .routed(destination, 0.5);
        lane.steps = [true; envgen::NUM_STEPS];
        params = params.with_lane(i, lane);
    }
    params
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let block_beats = size as f64 / SR * 2.0;

        // Eight lanes, stereo, no scope attached
        let mut engine = EnvGenEngine::new(EngineConfig::new(SR)).unwrap();
        let mut params = busy_params();
        let mut left = vec![0.1f32; size];
        let mut right = vec![-0.1f32; size];
        let mut position = 0.0;
        group.bench_with_input(BenchmarkId::new("8_lanes_stereo", size), &size, |b, _| {
            b.iter(|| {
                let transport = TransportSnapshot::playing(position, 120.0);
                engine.process_block(
                    &mut params,
                    black_box(&transport),
                    &mut [left.as_mut_slice(), right.as_mut_slice()],
                );
                position += block_beats;
            })
        });

        // Same with the measure scope attached
        let mut engine = EnvGenEngine::new(EngineConfig::new(SR)).unwrap();
        engine.attach_scope(Arc::new(ScopeBuffer::with_lanes(MAX_LANES, SR).unwrap()));
        let mut params = busy_params();
        let mut position = 0.0;
        group.bench_with_input(BenchmarkId::new("8_lanes_scope", size), &size, |b, _| {
            b.iter(|| {
                let transport = TransportSnapshot::playing(position, 120.0);
                engine.process_block(
                    &mut params,
                    black_box(&transport),
                    &mut [left.as_mut_slice(), right.as_mut_slice()],
                );
                position += block_beats;
            })
        });

        // Stopped transport: filter and gain only
        let mut engine = EnvGenEngine::new(EngineConfig::new(SR).lanes(1)).unwrap();
        let mut params = EngineParams::default().with_dry_pass(true);
        let stopped = TransportSnapshot::stopped();
        group.bench_with_input(BenchmarkId::new("stopped_dry", size), &size, |b, _| {
            b.iter(|| {
                engine.process_block(
                    &mut params,
                    black_box(&stopped),
                    &mut [left.as_mut_slice(), right.as_mut_slice()],
                );
            })
        });
    }

    group.finish();
}
