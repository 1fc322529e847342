//! Host transport snapshots and measure tracking.
//!
//! The host hands us one [`TransportSnapshot`] per audio block. It may jump
//! (the user clicked somewhere in the timeline), stall (the host reports the
//! same position twice), or wrap (a loop region restarted). [`TransportSync`]
//! turns that stream into a small set of events the sequencer and the scope
//! can act on.

use super::time_signature::TimeSignature;

/// A jump larger than this many quarter notes between consecutive blocks is
/// a relocation, not playback.
pub const SEEK_THRESHOLD_BEATS: f64 = 0.5;

/// Tempo used when the host reports zero, negative or non-finite BPM.
pub const DEFAULT_BPM: f64 = 120.0;

/// Host transport state captured once per audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub is_playing: bool,
    /// Musical position in quarter notes
    pub position: f64,
    pub bpm: f64,
    pub time_sig_numerator: i32,
    pub time_sig_denominator: i32,
}

impl TransportSnapshot {
    /// Stopped transport at the song start, 120 BPM, 4/4.
    pub fn stopped() -> Self {
        Self {
            is_playing: false,
            position: 0.0,
            bpm: DEFAULT_BPM,
            time_sig_numerator: 4,
            time_sig_denominator: 4,
        }
    }

    /// Playing transport in 4/4.
    pub fn playing(position: f64, bpm: f64) -> Self {
        Self {
            is_playing: true,
            position,
            bpm,
            ..Self::stopped()
        }
    }

    pub fn with_time_signature(mut self, numerator: i32, denominator: i32) -> Self {
        self.time_sig_numerator = numerator;
        self.time_sig_denominator = denominator;
        self
    }

    /// Copy with every field made safe to compute with: default tempo and
    /// meter for degenerate values, and a non-finite position read as stopped.
    pub fn normalized(&self) -> Self {
        let time_signature = self.time_signature();
        let position_ok = self.position.is_finite();

        Self {
            is_playing: self.is_playing && position_ok,
            position: if position_ok { self.position } else { 0.0 },
            bpm: self.tempo(),
            time_sig_numerator: time_signature.numerator as i32,
            time_sig_denominator: time_signature.denominator as i32,
        }
    }

    /// Tempo with the default substituted for unusable values.
    pub fn tempo(&self) -> f64 {
        if self.bpm.is_finite() && self.bpm > 0.0 {
            self.bpm
        } else {
            DEFAULT_BPM
        }
    }

    pub fn time_signature(&self) -> TimeSignature {
        TimeSignature::from_host(self.time_sig_numerator, self.time_sig_denominator)
    }

    pub fn quarter_notes_per_bar(&self) -> f64 {
        self.time_signature().quarter_notes_per_bar()
    }

    /// Samples in one bar at this tempo and meter.
    pub fn samples_per_measure(&self, sample_rate: f64) -> f64 {
        (60.0 / self.tempo()) * sample_rate * self.quarter_notes_per_bar()
    }
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self::stopped()
    }
}

/// Why a new measure capture started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// First playing block after construction or a stop
    FirstSample,
    /// Position jumped by more than [`SEEK_THRESHOLD_BEATS`]
    Seek,
    /// Position within the bar went backwards: a new bar began
    MeasureWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// Transport is not playing; nothing should trigger
    Stopped,
    /// Normal playback inside the current measure
    Running,
    /// Start a fresh measure capture
    Reset(ResetReason),
}

impl TransportEvent {
    pub fn is_reset(&self) -> bool {
        matches!(self, TransportEvent::Reset(_))
    }
}

/// Classifies successive transport snapshots.
#[derive(Debug, Clone)]
pub struct TransportSync {
    last_position: Option<f64>,
    measure_start: f64,
    quarter_notes_per_bar: f64,
    bpm: f64,
}

impl TransportSync {
    pub fn new() -> Self {
        Self {
            last_position: None,
            measure_start: 0.0,
            quarter_notes_per_bar: 4.0,
            bpm: DEFAULT_BPM,
        }
    }

    /// Feed the next block's snapshot.
    pub fn update(&mut self, snapshot: &TransportSnapshot) -> TransportEvent {
        let snapshot = snapshot.normalized();
        self.quarter_notes_per_bar = snapshot.quarter_notes_per_bar();
        self.bpm = snapshot.bpm;

        if !snapshot.is_playing {
            self.last_position = None;
            return TransportEvent::Stopped;
        }

        let position = snapshot.position;
        let event = match self.last_position {
            None => TransportEvent::Reset(ResetReason::FirstSample),
            Some(last) if (position - last).abs() > SEEK_THRESHOLD_BEATS => {
                TransportEvent::Reset(ResetReason::Seek)
            }
            Some(last) if self.position_in_measure(position) < self.position_in_measure(last) => {
                TransportEvent::Reset(ResetReason::MeasureWrap)
            }
            Some(_) => TransportEvent::Running,
        };

        if event.is_reset() {
            self.measure_start = position;
        }
        self.last_position = Some(position);

        event
    }

    /// Forget the previous position; the next playing block reports
    /// `FirstSample`.
    pub fn reset(&mut self) {
        self.last_position = None;
    }

    /// Position within the current bar, in quarter notes. Pre-roll
    /// (negative) positions map into the bar that precedes zero.
    pub fn position_in_measure(&self, position: f64) -> f64 {
        if self.quarter_notes_per_bar <= 0.0 {
            return 0.0;
        }
        position.rem_euclid(self.quarter_notes_per_bar)
    }

    /// Position where the current measure capture started.
    pub fn measure_start(&self) -> f64 {
        self.measure_start
    }

    pub fn last_position(&self) -> Option<f64> {
        self.last_position
    }

    pub fn quarter_notes_per_bar(&self) -> f64 {
        self.quarter_notes_per_bar
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }
}

impl Default for TransportSync {
    fn default() -> Self {
        Self::new()
    }
}
