use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use super::config::EngineConfig;
use super::lane::Lane;
use crate::dsp::filter::SVFilter;
use crate::dsp::modulate::{base_gain, Destination, ModulationMixer};
use crate::error::{try_zeroed, SetupError};
use crate::io::converter::{db_to_gain, mono_mix};
use crate::params::{EngineParams, ParameterStore};
use crate::scope::ScopeDataSink;
use crate::sequencing::TransportSnapshot;
use crate::MAX_LANES;

/*
Block Processing
================

Every host block runs the same pipeline, in place on planar channel slices:

    read parameters ─→ input gain ─→ sequencers (once, from the block's
    transport) ─→ per sample: envelopes → mixer → filter → volume
    ─→ output gain ─→ scope

Transport arrives once per block, so step edges land on block boundaries.
Blocks longer than `max_block_size` are split, and each piece sees the
position advanced by the time already rendered.

The cutoff is only re-coefficiented per sample when a lane actually targets
it; otherwise the filter runs on the base cutoff for the whole block.
*/

struct IndicatorShared {
    steps: [AtomicUsize; MAX_LANES],
    levels: [AtomicU32; MAX_LANES],
    playing: AtomicBool,
    lanes: usize,
}

/// Read-only view of lane playheads for a UI thread.
#[derive(Clone)]
pub struct StepIndicator {
    shared: Arc<IndicatorShared>,
}

impl StepIndicator {
    fn new(lanes: usize) -> Self {
        Self {
            shared: Arc::new(IndicatorShared {
                steps: std::array::from_fn(|_| AtomicUsize::new(0)),
                levels: std::array::from_fn(|_| AtomicU32::new(0.0f32.to_bits())),
                playing: AtomicBool::new(false),
                lanes,
            }),
        }
    }

    /// Current step of `lane`, or `None` for lanes the engine doesn't have.
    pub fn current_step(&self, lane: usize) -> Option<usize> {
        if lane >= self.shared.lanes {
            return None;
        }
        Some(self.shared.steps[lane].load(Ordering::Relaxed))
    }

    /// Envelope value at the end of the last block.
    pub fn envelope_level(&self, lane: usize) -> Option<f32> {
        if lane >= self.shared.lanes {
            return None;
        }
        Some(f32::from_bits(self.shared.levels[lane].load(Ordering::Relaxed)))
    }

    /// Whether the last block saw a playing transport.
    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }

    pub fn lane_count(&self) -> usize {
        self.shared.lanes
    }

    fn publish(&self, lanes: &[Lane], playing: bool) {
        for (i, lane) in lanes.iter().enumerate() {
            self.shared.steps[i].store(lane.current_step(), Ordering::Relaxed);
            self.shared.levels[i].store(lane.envelope().current_value().to_bits(), Ordering::Relaxed);
        }
        self.shared.playing.store(playing, Ordering::Relaxed);
    }
}

/// The per-block processor: lanes, modulation, filter, gain and scope feed.
pub struct EnvGenEngine {
    config: EngineConfig,
    sample_rate: f32,
    lanes: Vec<Lane>,
    filter: SVFilter,
    mixer: ModulationMixer,
    params: EngineParams,
    mono_scratch: Vec<f32>,
    envelope_scratch: Vec<Vec<f32>>,
    scope: Option<Arc<dyn ScopeDataSink>>,
    indicator: StepIndicator,
}

impl EnvGenEngine {
    pub fn new(config: EngineConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let sample_rate = config.sample_rate as f32;
        let lanes = (0..config.lanes)
            .map(|_| Lane::new(sample_rate, config.smoothing))
            .collect();
        let mono_scratch = try_zeroed("mono scratch", config.max_block_size)?;
        let envelope_scratch = (0..config.lanes)
            .map(|_| try_zeroed("envelope scratch", config.max_block_size))
            .collect::<Result<Vec<_>, _>>()?;

        let params = EngineParams::default();
        let mut filter = SVFilter::new(params.filter_mode, sample_rate);
        filter.set_cutoff(params.filter_cutoff);
        filter.set_resonance(params.filter_resonance);

        log::info!(
            "engine: {} lanes at {} Hz, blocks up to {} samples, smoothing {:?}",
            config.lanes,
            config.sample_rate,
            config.max_block_size,
            config.smoothing
        );

        Ok(Self {
            config,
            sample_rate,
            lanes,
            filter,
            mixer: ModulationMixer::new(),
            params,
            mono_scratch,
            envelope_scratch,
            scope: None,
            indicator: StepIndicator::new(config.lanes),
        })
    }

    /// Adopt a new sample rate. Envelopes, sequencers and filter state are
    /// reset. An attached scope buffer must be prepared separately.
    pub fn prepare(&mut self, sample_rate: f64) -> Result<(), SetupError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SetupError::InvalidSampleRate(sample_rate));
        }

        log::debug!("engine sample rate {} -> {}", self.config.sample_rate, sample_rate);
        self.config.sample_rate = sample_rate;
        self.sample_rate = sample_rate as f32;

        for lane in self.lanes.iter_mut() {
            lane.prepare(self.sample_rate);
        }
        self.filter.prepare(self.sample_rate);
        Ok(())
    }

    /// Silence every lane and clear filter memory.
    pub fn reset(&mut self) {
        for lane in self.lanes.iter_mut() {
            lane.reset();
        }
        self.filter.reset();
    }

    pub fn attach_scope(&mut self, scope: Arc<dyn ScopeDataSink>) {
        log::debug!("scope attached");
        self.scope = Some(scope);
    }

    pub fn detach_scope(&mut self) -> Option<Arc<dyn ScopeDataSink>> {
        if self.scope.is_some() {
            log::debug!("scope detached");
        }
        self.scope.take()
    }

    pub fn has_scope(&self) -> bool {
        self.scope.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    pub fn current_step(&self, lane: usize) -> Option<usize> {
        self.lanes.get(lane).map(Lane::current_step)
    }

    /// Handle for reading lane playheads from another thread.
    pub fn step_indicator(&self) -> StepIndicator {
        self.indicator.clone()
    }

    /// Process one host block in place.
    ///
    /// `channels` are planar and processed up to the shortest one. Channels
    /// past the second are gain-staged but not filtered.
    pub fn process_block<P: ParameterStore + ?Sized>(
        &mut self,
        store: &mut P,
        transport: &TransportSnapshot,
        channels: &mut [&mut [f32]],
    ) {
        store.read_into(&mut self.params);
        self.apply_params();

        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        if frames == 0 {
            return;
        }

        let transport = transport.normalized();
        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(self.config.max_block_size);
            let snapshot = self.advance(&transport, offset);
            self.process_chunk(&snapshot, channels, offset, len);
            offset += len;
        }

        self.indicator.publish(&self.lanes, transport.is_playing);
    }

    fn apply_params(&mut self) {
        self.params = self.params.sanitized();
        for (lane, config) in self.lanes.iter_mut().zip(self.params.lanes.iter()) {
            lane.apply(config);
        }
        self.filter.set_mode(self.params.filter_mode);
        self.filter.set_resonance(self.params.filter_resonance);
    }

    /// Transport for a piece starting `offset` samples into the block.
    fn advance(&self, transport: &TransportSnapshot, offset: usize) -> TransportSnapshot {
        let mut snapshot = *transport;
        if offset > 0 && snapshot.is_playing {
            let seconds = offset as f64 / self.config.sample_rate;
            snapshot.position += seconds * snapshot.bpm / 60.0;
        }
        snapshot
    }

    fn process_chunk(
        &mut self,
        transport: &TransportSnapshot,
        channels: &mut [&mut [f32]],
        offset: usize,
        len: usize,
    ) {
        let end = offset + len;
        let input_gain = db_to_gain(self.params.input_gain_db);
        let output_gain = db_to_gain(self.params.output_gain_db);
        let dry_gain = base_gain(self.params.dry_pass);
        let base_cutoff = self.params.filter_cutoff;

        for channel in channels.iter_mut() {
            for sample in channel[offset..end].iter_mut() {
                *sample *= input_gain;
            }
        }

        for lane in self.lanes.iter_mut() {
            lane.advance_transport(transport);
        }

        let cutoff_modulated = self
            .lanes
            .iter()
            .any(|lane| lane.destination() == Destination::Cutoff && lane.amount() != 0.0);
        if !cutoff_modulated {
            self.filter.set_cutoff(base_cutoff);
        }

        for i in 0..len {
            self.mixer.clear();
            for (lane, scratch) in self.lanes.iter_mut().zip(self.envelope_scratch.iter_mut()) {
                let value = lane.next_sample();
                scratch[i] = value;
                self.mixer.add(lane.destination(), value, lane.amount());
            }

            if cutoff_modulated {
                self.filter.set_cutoff(self.mixer.cutoff(base_cutoff));
            }
            let gain = self.mixer.gain(dry_gain) * output_gain;

            for (ch, channel) in channels.iter_mut().enumerate() {
                let sample = &mut channel[offset + i];
                *sample = self.filter.process_sample(*sample, ch) * gain;
            }
        }

        if let Some(scope) = &self.scope {
            scope.update_transport(transport);

            let mono = &mut self.mono_scratch[..len];
            mono_mix(channels, offset, mono);
            scope.push_audio(mono);

            for (lane, scratch) in self.envelope_scratch.iter().enumerate() {
                scope.push_envelope(&scratch[..len], lane);
            }
        }
    }
}
