//! envgen - terminal demo of the step envelope engine
//!
//! Run with: cargo run --bin envgen
//!
//! A synthetic chord stands in for the host's input and a simulated
//! transport stands in for its timeline.

mod app;
mod input;
mod transport;
mod ui;

use app::EnvGen;
use envgen::{dsp::Destination, params::LaneConfig, sequencing::StepRate};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let pulse = LaneConfig::default()
        .with_steps(&[0, 4, 8, 12])
        .with_ahd(0.002, 0.05, 0.25)
        .routed(Destination::Volume, 1.0);

    let sweep = LaneConfig::default()
        .with_steps(&[2, 6, 10, 14])
        .with_rate(StepRate::Eighth)
        .with_ahd(0.01, 0.0, 0.4)
        .routed(Destination::Cutoff, 0.8);

    let ghost = LaneConfig::default()
        .with_steps(&[3, 7, 11, 15])
        .with_ahd(0.001, 0.01, 0.08)
        .routed(Destination::Volume, 0.4);

    EnvGen::new()
        .bpm(120.0)
        .time_signature(4, 4)
        .cutoff(600.0)
        .resonance(0.4)
        .lane(pulse)
        .lane(sweep)
        .lane(ghost)
        .run()
}
