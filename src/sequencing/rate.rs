#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How long one sequencer step lasts, as a note value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepRate {
    Bar,
    Half,
    Quarter,
    Eighth,
    #[default]
    Sixteenth,
    ThirtySecond,
}

impl StepRate {
    /// In choice-parameter order ("1/1" .. "1/32").
    pub const ALL: [StepRate; 6] = [
        StepRate::Bar,
        StepRate::Half,
        StepRate::Quarter,
        StepRate::Eighth,
        StepRate::Sixteenth,
        StepRate::ThirtySecond,
    ];

    /// Step length in quarter notes (beats)
    pub const fn beats_per_step(self) -> f64 {
        match self {
            StepRate::Bar => 4.0,
            StepRate::Half => 2.0,
            StepRate::Quarter => 1.0,
            StepRate::Eighth => 0.5,
            StepRate::Sixteenth => 0.25,
            StepRate::ThirtySecond => 0.125,
        }
    }

    /// Step length in seconds at the given tempo
    pub fn step_seconds(self, bpm: f64) -> f64 {
        self.beats_per_step() * 60.0 / bpm
    }

    /// Map a choice index to a rate, falling back to sixteenths.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        match self {
            StepRate::Bar => 0,
            StepRate::Half => 1,
            StepRate::Quarter => 2,
            StepRate::Eighth => 3,
            StepRate::Sixteenth => 4,
            StepRate::ThirtySecond => 5,
        }
    }

    /// Display label ("1/16")
    pub fn label(self) -> &'static str {
        match self {
            StepRate::Bar => "1/1",
            StepRate::Half => "1/2",
            StepRate::Quarter => "1/4",
            StepRate::Eighth => "1/8",
            StepRate::Sixteenth => "1/16",
            StepRate::ThirtySecond => "1/32",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beats_per_step() {
        let beats: Vec<f64> = StepRate::ALL.iter().map(|r| r.beats_per_step()).collect();
        assert_eq!(beats, vec![4.0, 2.0, 1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_sixteenth_at_120_bpm() {
        assert_eq!(StepRate::Sixteenth.step_seconds(120.0), 0.125);
    }

    #[test]
    fn test_index_roundtrip_and_fallback() {
        for rate in StepRate::ALL {
            assert_eq!(StepRate::from_index(rate.index()), rate);
        }
        assert_eq!(StepRate::from_index(42), StepRate::Sixteenth);
        assert_eq!(StepRate::default().label(), "1/16");
    }
}
