//! Envelope-to-parameter modulation mixing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::filter::{MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};

/*
Modulation Mixing
=================

Every lane produces a unipolar envelope (0..1) and scales it by a bipolar
`amount` (-1..+1). The product is routed to one destination. Lanes that pick
the same destination are SUMMED, so two lanes at +0.5 hit as hard as one lane
at +1.0.

Vocabulary
----------

  contribution  envelope × amount for one lane, one sample.

  sum           All contributions for one destination, one sample.

  base          The parameter's value with no modulation: the cutoff knob,
                or the dry gain (1.0 with dry pass on, 0.0 with it off).


Cutoff: Exponential Scaling
---------------------------

Pitch perception is logarithmic, so a linear Hz offset sounds tiny at the top
of the range and enormous at the bottom. We scale in octaves instead:

    cutoff = clamp(base × 2^(sum × 4), 20, 20000)

sum = +1 opens four octaves, sum = -1 closes four octaves, and a given amount
sounds like the same "distance" wherever the knob sits.


Volume: Asymmetric Scaling
--------------------------

    sum > 0   gain = base + sum × 3      boost, up to +3 over base
    sum < 0   gain = base + sum          duck, down to (not below) 0
    sum = 0   gain = base

With dry pass off the base is 0, so the envelope fully gates the input and a
positive lane at amount 1.0 produces gain = envelope × 3 exactly.


Sample-Rate Modulation
----------------------

Envelopes move every sample and a 1 ms attack is only ~48 samples long, so
the mixer runs once per sample. Averaging over a block (fine for slow LFOs)
would smear the attack of every step.
*/

/// Octaves of cutoff travel for a full-scale (±1) sum.
pub const CUTOFF_OCTAVES: f32 = 4.0;
/// Gain added per unit of positive volume sum.
pub const VOLUME_BOOST: f32 = 3.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// Lane is sequenced and visualized but modulates nothing.
    #[default]
    None,
    Cutoff,
    Volume,
}

impl Destination {
    pub const ALL: [Destination; 3] = [Destination::None, Destination::Cutoff, Destination::Volume];

    /// Map a choice index to a destination, falling back to `None`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        match self {
            Destination::None => 0,
            Destination::Cutoff => 1,
            Destination::Volume => 2,
        }
    }
}

/// Per-sample modulation sums, one per destination.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModulationMixer {
    cutoff_sum: f32,
    volume_sum: f32,
}

impl ModulationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the sums at the start of a sample.
    #[inline]
    pub fn clear(&mut self) {
        self.cutoff_sum = 0.0;
        self.volume_sum = 0.0;
    }

    /// Add one lane's contribution to its destination.
    #[inline]
    pub fn add(&mut self, destination: Destination, envelope: f32, amount: f32) {
        let contribution = envelope * amount.clamp(-1.0, 1.0);
        match destination {
            Destination::None => {}
            Destination::Cutoff => self.cutoff_sum += contribution,
            Destination::Volume => self.volume_sum += contribution,
        }
    }

    pub fn cutoff_sum(&self) -> f32 {
        self.cutoff_sum
    }

    pub fn volume_sum(&self) -> f32 {
        self.volume_sum
    }

    /// Modulated filter cutoff for the current sums.
    #[inline]
    pub fn cutoff(&self, base_cutoff: f32) -> f32 {
        modulated_cutoff(base_cutoff, self.cutoff_sum)
    }

    /// Modulated output gain for the current sums.
    #[inline]
    pub fn gain(&self, base_gain: f32) -> f32 {
        modulated_gain(base_gain, self.volume_sum)
    }
}

/// Base gain for the volume stage. Configurations without a dry pass toggle
/// should pass `true`.
#[inline]
pub fn base_gain(dry_pass: bool) -> f32 {
    if dry_pass {
        1.0
    } else {
        0.0
    }
}

#[inline]
pub fn modulated_cutoff(base_cutoff: f32, sum: f32) -> f32 {
    if sum == 0.0 {
        return base_cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }
    (base_cutoff * (sum * CUTOFF_OCTAVES).exp2()).clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

#[inline]
pub fn modulated_gain(base_gain: f32, sum: f32) -> f32 {
    let gain = if sum > 0.0 {
        base_gain + sum * VOLUME_BOOST
    } else if sum < 0.0 {
        base_gain + sum
    } else {
        base_gain
    };
    gain.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_changes_nothing() {
        let mut mixer = ModulationMixer::new();
        for &env in &[0.0, 0.3, 1.0] {
            mixer.clear();
            mixer.add(Destination::Cutoff, env, 0.0);
            mixer.add(Destination::Volume, env, 0.0);

            assert_eq!(mixer.cutoff(1_000.0), 1_000.0);
            assert_eq!(mixer.gain(base_gain(true)), 1.0);
            assert_eq!(mixer.gain(base_gain(false)), 0.0);
        }
    }

    #[test]
    fn single_volume_lane_without_dry_is_triple_envelope() {
        let mut mixer = ModulationMixer::new();
        for i in 0..=100 {
            let env = i as f32 / 100.0;
            mixer.clear();
            mixer.add(Destination::Volume, env, 1.0);

            let gain = mixer.gain(base_gain(false));
            assert_eq!(gain, env * 3.0);
            assert!((0.0..=3.0).contains(&gain));
        }
    }

    #[test]
    fn negative_volume_ducks_but_never_below_zero() {
        assert_eq!(modulated_gain(1.0, -0.25), 0.75);
        assert_eq!(modulated_gain(1.0, -1.0), 0.0);
        assert_eq!(modulated_gain(0.0, -0.5), 0.0);
        assert_eq!(modulated_gain(1.0, -2.0), 0.0);
    }

    #[test]
    fn contributions_are_summed_not_averaged() {
        let mut mixer = ModulationMixer::new();
        mixer.add(Destination::Volume, 0.5, 1.0);
        mixer.add(Destination::Volume, 0.5, 1.0);
        mixer.add(Destination::None, 1.0, 1.0);

        assert_eq!(mixer.volume_sum(), 1.0);
        assert_eq!(mixer.cutoff_sum(), 0.0);
        assert_eq!(mixer.gain(0.0), 3.0);
    }

    #[test]
    fn cutoff_moves_in_octaves() {
        // +1/4 sum is one octave
        assert!((modulated_cutoff(1_000.0, 0.25) - 2_000.0).abs() < 0.01);
        assert!((modulated_cutoff(1_000.0, -0.25) - 500.0).abs() < 0.01);
        assert!((modulated_cutoff(1_000.0, 1.0) - 16_000.0).abs() < 0.1);
    }

    #[test]
    fn cutoff_is_clamped() {
        assert_eq!(modulated_cutoff(10_000.0, 1.0), MAX_CUTOFF_HZ);
        assert_eq!(modulated_cutoff(100.0, -1.0), MIN_CUTOFF_HZ);
    }

    #[test]
    fn destination_index_roundtrip() {
        for destination in Destination::ALL {
            assert_eq!(Destination::from_index(destination.index()), destination);
        }
        assert_eq!(Destination::from_index(7), Destination::None);
    }
}
