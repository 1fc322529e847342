//! Simulated host transport
//!
//! Advances a musical position by the audio rendered, the way a DAW's
//! playhead does, and answers with one snapshot per block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use envgen::TransportSnapshot;

/// Commands sent from the UI thread to the audio thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    /// Toggle play/pause
    TogglePlayback,
    /// Jump by this many quarter notes
    Nudge(f64),
    /// Back to the start
    Rewind,
}

pub struct SimulatedTransport {
    playing: bool,
    position: f64,
    bpm: f64,
    numerator: i32,
    denominator: i32,
}

impl SimulatedTransport {
    pub fn new(bpm: f64, numerator: i32, denominator: i32) -> Self {
        Self {
            playing: true,
            position: 0.0,
            bpm,
            numerator,
            denominator,
        }
    }

    pub fn handle(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::TogglePlayback => self.playing = !self.playing,
            ControlMessage::Nudge(beats) => self.position = (self.position + beats).max(0.0),
            ControlMessage::Rewind => self.position = 0.0,
        }
    }

    /// Snapshot for the block about to render.
    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            is_playing: self.playing,
            position: self.position,
            bpm: self.bpm,
            time_sig_numerator: self.numerator,
            time_sig_denominator: self.denominator,
        }
    }

    /// Move the playhead past a rendered block.
    pub fn advance(&mut self, frames: usize, sample_rate: f64) {
        if self.playing {
            self.position += frames as f64 / sample_rate * self.bpm / 60.0;
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }
}

/// Playhead position shared with the UI (f64 bits in an atomic)
#[derive(Clone, Default)]
pub struct SharedPosition {
    bits: Arc<AtomicU64>,
}

impl SharedPosition {
    pub fn store(&self, position: f64) {
        self.bits.store(position.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
