use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_FILTER_CHANNELS;

/*
| mode      | output            | passes          | rejects      |
| --------- | ----------------- | --------------- | ------------ |
| low-pass  | v2                | below cutoff    | above cutoff |
| high-pass | in - k*v1 - v2    | above cutoff    | below cutoff |
| band-pass | v1                | around cutoff   | both sides   |

Coefficients (topology-preserving transform):

    g  = tan(pi * fc / sr)          prewarped integrator gain
    Q  = 0.5 + 19.5 * resonance     0.5 (flat) .. 20 (ringing)
    k  = 1 / Q                      damping
    a1 = 1 / (1 + g * (g + k))
    a2 = g * a1
    a3 = g * a2

They are only recomputed when cutoff, resonance or sample rate change. Under
per-sample cutoff modulation that is every sample, which is the expensive
path, so `set_cutoff` skips the work when the value did not move.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    LowPass,
    HighPass,
    BandPass,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::LowPass, FilterMode::HighPass, FilterMode::BandPass];

    /// Map a choice index to a mode, falling back to low-pass.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        match self {
            FilterMode::LowPass => 0,
            FilterMode::HighPass => 1,
            FilterMode::BandPass => 2,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    z1: [f32; MAX_FILTER_CHANNELS], // First integrator's memory, per channel
    z2: [f32; MAX_FILTER_CHANNELS], // Second integrator's memory, per channel

    cutoff_hz: f32,
    resonance: f32,
    mode: FilterMode,
    sample_rate: f32,

    g: f32,
    k: f32,
    a1: f32,
    a2: f32,
    a3: f32,
}

impl SVFilter {
    pub fn new(mode: FilterMode, sample_rate: f32) -> Self {
        let mut filter = Self {
            z1: [0.0; MAX_FILTER_CHANNELS],
            z2: [0.0; MAX_FILTER_CHANNELS],
            cutoff_hz: 1000.0,
            resonance: 0.0,
            mode,
            sample_rate,
            g: 0.0,
            k: 0.0,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
        };
        filter.calculate_coefficients();
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterMode::LowPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterMode::HighPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn bandpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterMode::BandPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    /// Adopt a new sample rate and clear all channel state.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.calculate_coefficients();
        self.reset();
    }

    /// One TPT step for one channel. Returns all three responses.
    #[inline]
    pub fn tick(&mut self, sample: f32, channel: usize) -> FilterOutputs {
        let z1 = self.z1[channel];
        let z2 = self.z2[channel];

        let v3 = sample - z2;
        let v1 = self.a1 * z1 + self.a2 * v3;
        let v2 = z2 + self.a2 * z1 + self.a3 * v3;

        self.z1[channel] = 2.0 * v1 - z1;
        self.z2[channel] = 2.0 * v2 - z2;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - self.k * v1 - v2,
        }
    }

    /// Filter one sample on `channel` using the selected mode. Channels past
    /// the supported count pass through untouched.
    #[inline]
    pub fn process_sample(&mut self, sample: f32, channel: usize) -> f32 {
        if channel >= MAX_FILTER_CHANNELS {
            return sample;
        }

        let outputs = self.tick(sample, channel);
        match self.mode {
            FilterMode::LowPass => outputs.lowpass,
            FilterMode::HighPass => outputs.highpass,
            FilterMode::BandPass => outputs.bandpass,
        }
    }

    /// Filter a single channel's block in place.
    pub fn render(&mut self, buffer: &mut [f32], channel: usize) {
        if channel >= MAX_FILTER_CHANNELS {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample, channel);
        }
    }

    /// Filter planar channels in place with fixed coefficients.
    pub fn render_channels(&mut self, channels: &mut [&mut [f32]]) {
        for (channel, buffer) in channels.iter_mut().enumerate() {
            self.render(buffer, channel);
        }
    }

    pub fn reset(&mut self) {
        self.z1 = [0.0; MAX_FILTER_CHANNELS];
        self.z2 = [0.0; MAX_FILTER_CHANNELS];
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff = clamp_cutoff(cutoff_hz, self.sample_rate);
        if cutoff != self.cutoff_hz {
            self.cutoff_hz = cutoff;
            self.calculate_coefficients();
        }
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        let resonance = if resonance.is_finite() {
            resonance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if resonance != self.resonance {
            self.resonance = resonance;
            self.calculate_coefficients();
        }
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    fn calculate_coefficients(&mut self) {
        let sr = self.sample_rate.max(1.0);
        self.g = (PI * self.cutoff_hz / sr).tan();

        let q = 0.5 + self.resonance * 19.5;
        self.k = 1.0 / q;

        self.a1 = 1.0 / (1.0 + self.g * (self.g + self.k));
        self.a2 = self.g * self.a1;
        self.a3 = self.g * self.a2;
    }
}

/// Clamp a cutoff into the audible range, and below Nyquist so `tan` stays
/// finite at low sample rates.
fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let ceiling = MAX_CUTOFF_HZ.min(sample_rate * 0.49).max(MIN_CUTOFF_HZ);
    if cutoff_hz.is_finite() {
        cutoff_hz.clamp(MIN_CUTOFF_HZ, ceiling)
    } else {
        ceiling
    }
}
