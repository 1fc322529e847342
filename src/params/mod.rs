//! Typed parameter snapshot and the ways it reaches the audio thread.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::filter::{FilterMode, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::dsp::modulate::Destination;
use crate::sequencing::StepRate;
use crate::{MAX_LANES, MIN_TIME, NUM_STEPS};

pub mod id;
#[cfg(feature = "rtrb")]
pub mod queue;

pub use id::ParamId;
#[cfg(feature = "rtrb")]
pub use queue::{param_channel, ParamChange, ParamReceiver, ParamSender};

/// Longest attack, hold or decay time in seconds.
pub const MAX_TIME: f32 = 10.0;
/// Input and output gain range in dB.
pub const MIN_GAIN_DB: f32 = -24.0;
pub const MAX_GAIN_DB: f32 = 24.0;

/// Settings for one envelope lane.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneConfig {
    pub steps: [bool; NUM_STEPS],
    pub rate: StepRate,
    /// Seconds
    pub attack: f32,
    /// Seconds, may be 0
    pub hold: f32,
    /// Seconds
    pub decay: f32,
    pub destination: Destination,
    /// Bipolar depth, -1..1
    pub amount: f32,
}

impl LaneConfig {
    /// Copy with every value in range. Non-finite values take the default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            steps: self.steps,
            rate: self.rate,
            attack: finite_or(self.attack, defaults.attack).clamp(MIN_TIME, MAX_TIME),
            hold: finite_or(self.hold, defaults.hold).clamp(0.0, MAX_TIME),
            decay: finite_or(self.decay, defaults.decay).clamp(MIN_TIME, MAX_TIME),
            destination: self.destination,
            amount: finite_or(self.amount, defaults.amount).clamp(-1.0, 1.0),
        }
    }

    pub fn with_steps(mut self, steps: &[usize]) -> Self {
        for &step in steps {
            if let Some(s) = self.steps.get_mut(step) {
                *s = true;
            }
        }
        self
    }

    pub fn with_ahd(mut self, attack: f32, hold: f32, decay: f32) -> Self {
        self.attack = attack;
        self.hold = hold;
        self.decay = decay;
        self
    }

    pub fn with_rate(mut self, rate: StepRate) -> Self {
        self.rate = rate;
        self
    }

    pub fn routed(mut self, destination: Destination, amount: f32) -> Self {
        self.destination = destination;
        self.amount = amount;
        self
    }
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            steps: [false; NUM_STEPS],
            rate: StepRate::Sixteenth,
            attack: 0.01,
            hold: 0.1,
            decay: 0.5,
            destination: Destination::None,
            amount: 1.0,
        }
    }
}

/// Every parameter the engine reads, once per block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    pub input_gain_db: f32,
    pub output_gain_db: f32,
    /// Input passes at unity when on; silent until an envelope opens it when off.
    pub dry_pass: bool,
    pub filter_mode: FilterMode,
    pub filter_cutoff: f32,
    pub filter_resonance: f32,
    pub lanes: [LaneConfig; MAX_LANES],
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            dry_pass: false,
            filter_mode: FilterMode::LowPass,
            filter_cutoff: MAX_CUTOFF_HZ,
            filter_resonance: 0.0,
            lanes: [LaneConfig::default(); MAX_LANES],
        }
    }
}

impl EngineParams {
    /// Copy with every value in range. Non-finite values take the default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            input_gain_db: clamp_gain(self.input_gain_db, defaults.input_gain_db),
            output_gain_db: clamp_gain(self.output_gain_db, defaults.output_gain_db),
            dry_pass: self.dry_pass,
            filter_mode: self.filter_mode,
            filter_cutoff: finite_or(self.filter_cutoff, defaults.filter_cutoff)
                .clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
            filter_resonance: finite_or(self.filter_resonance, defaults.filter_resonance)
                .clamp(0.0, 1.0),
            lanes: self.lanes.map(|lane| lane.sanitized()),
        }
    }

    pub fn with_lane(mut self, index: usize, lane: LaneConfig) -> Self {
        if let Some(slot) = self.lanes.get_mut(index) {
            *slot = lane;
        }
        self
    }

    pub fn with_dry_pass(mut self, dry_pass: bool) -> Self {
        self.dry_pass = dry_pass;
        self
    }

    pub fn with_filter(mut self, mode: FilterMode, cutoff: f32, resonance: f32) -> Self {
        self.filter_mode = mode;
        self.filter_cutoff = cutoff;
        self.filter_resonance = resonance;
        self
    }

    /// Set one parameter from a plain value: bools as 0/1, choices as their
    /// index, everything else in its natural unit. Values are clamped.
    pub fn set(&mut self, id: ParamId, value: f32) {
        let lane = match id.lane() {
            Some(lane) if lane >= MAX_LANES => return,
            Some(lane) => Some(lane),
            None => None,
        };

        match id {
            ParamId::InputGain => self.input_gain_db = clamp_gain(value, self.input_gain_db),
            ParamId::OutputGain => self.output_gain_db = clamp_gain(value, self.output_gain_db),
            ParamId::DryPass => self.dry_pass = value >= 0.5,
            ParamId::FilterMode => self.filter_mode = FilterMode::from_index(choice(value)),
            ParamId::FilterCutoff => {
                self.filter_cutoff =
                    finite_or(value, self.filter_cutoff).clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
            }
            ParamId::FilterResonance => {
                self.filter_resonance = finite_or(value, self.filter_resonance).clamp(0.0, 1.0)
            }
            _ => {
                let Some(lane) = lane else { return };
                let config = &mut self.lanes[lane];
                match id {
                    ParamId::Step { step, .. } => {
                        if let Some(s) = config.steps.get_mut(step) {
                            *s = value >= 0.5;
                        }
                    }
                    ParamId::Attack(_) => config.attack = value,
                    ParamId::Hold(_) => config.hold = value,
                    ParamId::Decay(_) => config.decay = value,
                    ParamId::Rate(_) => config.rate = StepRate::from_index(choice(value)),
                    ParamId::Destination(_) => {
                        config.destination = Destination::from_index(choice(value))
                    }
                    ParamId::Amount(_) => config.amount = value,
                    _ => {}
                }
                *config = config.sanitized();
            }
        }
    }

    /// Read one parameter in the same convention as [`set`](Self::set).
    /// Out-of-range lanes read 0.
    pub fn get(&self, id: ParamId) -> f32 {
        let lane = id.lane().and_then(|lane| self.lanes.get(lane));
        match (id, lane) {
            (ParamId::InputGain, _) => self.input_gain_db,
            (ParamId::OutputGain, _) => self.output_gain_db,
            (ParamId::DryPass, _) => bool_value(self.dry_pass),
            (ParamId::FilterMode, _) => self.filter_mode.index() as f32,
            (ParamId::FilterCutoff, _) => self.filter_cutoff,
            (ParamId::FilterResonance, _) => self.filter_resonance,
            (ParamId::Step { step, .. }, Some(l)) => {
                bool_value(l.steps.get(step).copied().unwrap_or(false))
            }
            (ParamId::Attack(_), Some(l)) => l.attack,
            (ParamId::Hold(_), Some(l)) => l.hold,
            (ParamId::Decay(_), Some(l)) => l.decay,
            (ParamId::Rate(_), Some(l)) => l.rate.index() as f32,
            (ParamId::Destination(_), Some(l)) => l.destination.index() as f32,
            (ParamId::Amount(_), Some(l)) => l.amount,
            _ => 0.0,
        }
    }
}

/// Source of parameter values for the engine, read once at the top of
/// every block.
pub trait ParameterStore {
    fn read_into(&mut self, params: &mut EngineParams);
}

impl ParameterStore for EngineParams {
    fn read_into(&mut self, params: &mut EngineParams) {
        *params = *self;
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn clamp_gain(value: f32, fallback: f32) -> f32 {
    finite_or(value, fallback).clamp(MIN_GAIN_DB, MAX_GAIN_DB)
}

fn choice(value: f32) -> usize {
    if value.is_finite() && value > 0.0 {
        value.round() as usize
    } else {
        0
    }
}

fn bool_value(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_snapshot_clamps_gains_and_filter() {
        let params = EngineParams {
            input_gain_db: f32::NAN,
            output_gain_db: 100.0,
            filter_cutoff: f32::INFINITY,
            filter_resonance: -2.0,
            ..EngineParams::default()
        }
        .with_lane(0, LaneConfig::default().routed(Destination::Volume, 3.0))
        .sanitized();

        assert_eq!(params.input_gain_db, 0.0);
        assert_eq!(params.output_gain_db, MAX_GAIN_DB);
        assert_eq!(params.filter_cutoff, MAX_CUTOFF_HZ);
        assert_eq!(params.filter_resonance, 0.0);
        assert_eq!(params.lanes[0].amount, 1.0);
    }

    #[test]
    fn defaults_follow_the_plugin() {
        let lane = LaneConfig::default();
        assert_eq!(lane.attack, 0.01);
        assert_eq!(lane.hold, 0.1);
        assert_eq!(lane.decay, 0.5);
        assert_eq!(lane.rate, StepRate::Sixteenth);
        assert_eq!(lane.destination, Destination::None);
        assert_eq!(lane.amount, 1.0);

        let params = EngineParams::default();
        assert!(!params.dry_pass);
        assert_eq!(params.input_gain_db, 0.0);
    }

    #[test]
    fn set_and_get_by_id() {
        let mut params = EngineParams::default();
        params.set(ParamId::Step { lane: 1, step: 5 }, 1.0);
        params.set(ParamId::Rate(1), 3.0);
        params.set(ParamId::Destination(1), 2.0);
        params.set(ParamId::Amount(1), -0.5);
        params.set(ParamId::FilterMode, 2.0);

        assert!(params.lanes[1].steps[5]);
        assert_eq!(params.lanes[1].rate, StepRate::Eighth);
        assert_eq!(params.lanes[1].destination, Destination::Volume);
        assert_eq!(params.get(ParamId::Amount(1)), -0.5);
        assert_eq!(params.get(ParamId::Step { lane: 1, step: 5 }), 1.0);
        assert_eq!(params.get(ParamId::Rate(1)), 3.0);
        assert_eq!(params.filter_mode, FilterMode::BandPass);
    }

    #[test]
    fn set_clamps() {
        let mut params = EngineParams::default();
        params.set(ParamId::Attack(0), 0.0);
        params.set(ParamId::Decay(0), 100.0);
        params.set(ParamId::Hold(0), -1.0);
        params.set(ParamId::Amount(0), 3.0);
        params.set(ParamId::InputGain, 48.0);
        params.set(ParamId::FilterCutoff, 5.0);
        params.set(ParamId::FilterResonance, f32::NAN);

        assert_eq!(params.lanes[0].attack, MIN_TIME);
        assert_eq!(params.lanes[0].decay, MAX_TIME);
        assert_eq!(params.lanes[0].hold, 0.0);
        assert_eq!(params.lanes[0].amount, 1.0);
        assert_eq!(params.input_gain_db, MAX_GAIN_DB);
        assert_eq!(params.filter_cutoff, MIN_CUTOFF_HZ);
        assert_eq!(params.filter_resonance, 0.0);
    }

    #[test]
    fn out_of_range_lane_is_ignored() {
        let mut params = EngineParams::default();
        let before = params;
        params.set(ParamId::Attack(MAX_LANES), 1.0);
        assert_eq!(params, before);
        assert_eq!(params.get(ParamId::Attack(MAX_LANES)), 0.0);
    }

    #[test]
    fn sanitized_replaces_non_finite() {
        let lane = LaneConfig {
            attack: f32::NAN,
            decay: f32::INFINITY,
            ..LaneConfig::default()
        }
        .sanitized();
        assert_eq!(lane.attack, 0.01);
        assert_eq!(lane.decay, 0.5);
    }

    #[test]
    fn snapshot_store_copies_everything() {
        let mut source = EngineParams::default()
            .with_dry_pass(true)
            .with_lane(2, LaneConfig::default().with_steps(&[0, 4, 8, 12]));
        let mut target = EngineParams::default();
        source.read_into(&mut target);
        assert_eq!(target, source);
    }
}
