//! EnvGen - demo application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::sync::Arc;

use super::input::SawChord;
use super::transport::{ControlMessage, SharedPosition, SimulatedTransport};
use super::ui::{UiApp, UiLinks, UiStateInit};

use envgen::{
    dsp::FilterMode,
    io::interleave,
    params::{param_channel, queue::PARAM_QUEUE_SIZE, EngineParams, LaneConfig},
    scope::{ScopeBuffer, ScopeReader},
    EngineConfig, EnvGenEngine, TransportSnapshot, MAX_BLOCK_SIZE, MAX_LANES,
};

const CONTROL_QUEUE_SIZE: usize = 64;

/// Main application builder
pub struct EnvGen {
    bpm: f64,
    numerator: i32,
    denominator: i32,
    cutoff: f32,
    resonance: f32,
    lanes: Vec<LaneConfig>,
}

impl EnvGen {
    pub fn new() -> Self {
        Self {
            bpm: 120.0,
            numerator: 4,
            denominator: 4,
            cutoff: 1_000.0,
            resonance: 0.0,
            lanes: Vec::new(),
        }
    }

    /// Set the tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn time_signature(mut self, numerator: i32, denominator: i32) -> Self {
        self.numerator = numerator;
        self.denominator = denominator;
        self
    }

    /// Base filter cutoff in Hz
    pub fn cutoff(mut self, cutoff: f32) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn resonance(mut self, resonance: f32) -> Self {
        self.resonance = resonance;
        self
    }

    /// Add a lane. Lanes past the eighth are ignored.
    pub fn lane(mut self, lane: LaneConfig) -> Self {
        if self.lanes.len() < MAX_LANES {
            self.lanes.push(lane);
        }
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        let lane_count = self.lanes.len().max(1);

        log::info!("output: {} Hz, {} channels", sample_rate, channels);

        let mut engine = EnvGenEngine::new(
            EngineConfig::new(sample_rate)
                .lanes(lane_count)
                .max_block_size(MAX_BLOCK_SIZE),
        )
        .wrap_err("failed to build engine")?;

        let scope = Arc::new(
            ScopeBuffer::new(engine.config().scope_capacity, lane_count, sample_rate)
                .wrap_err("failed to allocate scope")?,
        );
        engine.attach_scope(scope.clone());

        // Install the initial parameter snapshot before audio starts
        let mut params = EngineParams::default().with_filter(
            FilterMode::LowPass,
            self.cutoff,
            self.resonance,
        );
        for (i, lane) in self.lanes.iter().enumerate() {
            params = params.with_lane(i, *lane);
        }
        engine.process_block(&mut params, &TransportSnapshot::stopped(), &mut []);

        let indicator = engine.step_indicator();
        let (param_tx, mut param_rx) = param_channel(PARAM_QUEUE_SIZE);
        let (control_tx, mut control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_SIZE);
        let position = SharedPosition::default();

        let mut transport = SimulatedTransport::new(self.bpm, self.numerator, self.denominator);
        let mut input = SawChord::new(110.0, sample_rate as f32);
        let audio_position = position.clone();
        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut mixed_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                while let Ok(message) = control_rx.pop() {
                    transport.handle(message);
                }

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let snapshot = transport.snapshot();

                    {
                        let mut block = [&mut left[..frames], &mut right[..frames]];
                        input.render(&mut block, frames);
                        engine.process_block(&mut param_rx, &snapshot, &mut block);
                    }
                    transport.advance(frames, sample_rate);

                    let out_off = frames_written * channels;
                    let out = &mut data[out_off..out_off + frames * channels];
                    if channels == 2 {
                        interleave(&[&left[..frames], &right[..frames]], out);
                    } else {
                        let mixed = &mut mixed_buf[..frames];
                        for (i, m) in mixed.iter_mut().enumerate() {
                            *m = 0.5 * (left[i] + right[i]);
                        }
                        for (frame, &s) in out.chunks_exact_mut(channels).zip(mixed.iter()) {
                            frame.fill(s);
                        }
                    }

                    frames_written += frames;
                }

                audio_position.store(transport.position());
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        let init = UiStateInit {
            bpm: self.bpm,
            numerator: self.numerator,
            denominator: self.denominator,
            sample_rate: sample_rate as f32,
            lanes: self.lanes,
            cutoff: self.cutoff,
        };
        let links = UiLinks {
            reader: ScopeReader::new(scope),
            indicator,
            position,
            control_tx,
            param_tx,
        };

        let mut terminal = ratatui::init();
        let result = UiApp::new(init, links).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for EnvGen {
    fn default() -> Self {
        Self::new()
    }
}
