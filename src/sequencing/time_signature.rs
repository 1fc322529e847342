/// Time signature as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    /// Number of beats per bar (numerator)
    pub numerator: u8,
    /// Note value that gets one beat (denominator: 4 = quarter, 8 = eighth)
    pub denominator: u8,
}

impl TimeSignature {
    /// Standard 4/4 time, also the fallback for anything the host gets wrong
    pub const FOUR_FOUR: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    /// 3/4 time (waltz)
    pub const THREE_FOUR: TimeSignature = TimeSignature {
        numerator: 3,
        denominator: 4,
    };

    /// 6/8 time
    pub const SIX_EIGHT: TimeSignature = TimeSignature {
        numerator: 6,
        denominator: 8,
    };

    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Build from the host's raw fields. Zero, negative or oversized values
    /// fall back to 4/4.
    pub fn from_host(numerator: i32, denominator: i32) -> Self {
        match (u8::try_from(numerator), u8::try_from(denominator)) {
            (Ok(n), Ok(d)) if n > 0 && d > 0 => Self::new(n, d),
            _ => Self::FOUR_FOUR,
        }
    }

    /// Length of one bar in quarter notes
    /// Formula: 4 * numerator / denominator
    pub fn quarter_notes_per_bar(&self) -> f64 {
        if self.numerator == 0 || self.denominator == 0 {
            return 4.0;
        }
        4.0 * self.numerator as f64 / self.denominator as f64
    }

    /// Number of eighth-note grid lines across one bar (at least one)
    pub fn eighth_notes_per_bar(&self) -> u32 {
        Self::eighth_notes_in(self.quarter_notes_per_bar())
    }

    /// Eighth-note count for a bar length already in quarter notes. Bars
    /// that aren't positive and finite count as 4/4.
    pub fn eighth_notes_in(quarter_notes_per_bar: f64) -> u32 {
        if !(quarter_notes_per_bar.is_finite() && quarter_notes_per_bar > 0.0) {
            return Self::eighth_notes_in(Self::FOUR_FOUR.quarter_notes_per_bar());
        }
        ((quarter_notes_per_bar * 2.0).round() as u32).max(1)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}
