use parking_lot::Mutex;

use super::display::{downsample_into, DisplayFrame};
use super::sink::ScopeDataSink;
use crate::error::{try_zeroed, SetupError};
use crate::sequencing::{TransportSnapshot, TransportSync};
use crate::MAX_LANES;

/*
Measure Capture
===============

The scope shows exactly one bar: the audio that has played since the last
bar line, laid out left to right across a fixed-width display. Capture starts
empty at every bar line (and after a seek, or the first time the transport
plays) and fills until the next one.

    bar line                                          bar line
       │  audio pushed so far      │    not yet played    │
       ├───────────────────────────┼──────────────────────┤
       0                        cursor                expected

`expected` is how long the bar will be, computed from the latest tempo and
meter:

    expected = clamp(round((60 / bpm) * sample_rate * quarter_notes_per_bar),
                     1, capacity)

so the display can place the cursor correctly before the bar has finished.

Envelope lanes are written at the cursor position held before the block's
audio push, so lane data lines up with the audio it modulated even when the
block was cut short at capacity.

All buffers are allocated once. Writes past capacity are dropped.
*/

/// Four seconds at 48 kHz, enough for one bar at slow tempos.
pub const DEFAULT_SCOPE_CAPACITY: usize = 192_000;

struct ScopeState {
    mono: Vec<f32>,
    lanes: Vec<Vec<f32>>,
    cursor: usize,
    /// Cursor before the most recent `push_audio`
    last_push_start: usize,
    /// Everything at or beyond this index is zero
    high_water: usize,
    samples_in_measure: u64,
    sync: TransportSync,
    sample_rate: f64,
}

impl ScopeState {
    fn clear(&mut self) {
        let end = self.high_water;
        self.mono[..end].fill(0.0);
        for lane in self.lanes.iter_mut() {
            lane[..end].fill(0.0);
        }
        self.cursor = 0;
        self.last_push_start = 0;
        self.high_water = 0;
        self.samples_in_measure = 0;
    }

    fn expected_samples(&self, capacity: usize) -> usize {
        let samples_per_quarter = (60.0 / self.sync.bpm()) * self.sample_rate;
        let expected = (samples_per_quarter * self.sync.quarter_notes_per_bar()).round();
        if !expected.is_finite() {
            return capacity;
        }
        (expected.max(1.0) as usize).clamp(1, capacity)
    }
}

/// Measure-synced capture of mono audio and per-lane envelopes.
///
/// Shared between the audio thread (through [`ScopeDataSink`]) and a display
/// thread (through [`ScopeBuffer::snapshot_into`] or a
/// [`ScopeReader`](super::ScopeReader)).
pub struct ScopeBuffer {
    state: Mutex<ScopeState>,
    capacity: usize,
    lane_count: usize,
}

impl ScopeBuffer {
    pub fn new(capacity: usize, lane_count: usize, sample_rate: f64) -> Result<Self, SetupError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SetupError::InvalidSampleRate(sample_rate));
        }
        if lane_count == 0 || lane_count > MAX_LANES {
            return Err(SetupError::InvalidLaneCount {
                requested: lane_count,
                max: MAX_LANES,
            });
        }

        let capacity = capacity.max(1);
        let mono = try_zeroed("scope audio", capacity)?;
        let lanes = (0..lane_count)
            .map(|_| try_zeroed("scope envelope", capacity))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "scope buffer: {} lanes, {} samples at {} Hz",
            lane_count,
            capacity,
            sample_rate
        );

        Ok(Self {
            state: Mutex::new(ScopeState {
                mono,
                lanes,
                cursor: 0,
                last_push_start: 0,
                high_water: 0,
                samples_in_measure: 0,
                sync: TransportSync::new(),
                sample_rate,
            }),
            capacity,
            lane_count,
        })
    }

    /// Default capacity.
    pub fn with_lanes(lane_count: usize, sample_rate: f64) -> Result<Self, SetupError> {
        Self::new(DEFAULT_SCOPE_CAPACITY, lane_count, sample_rate)
    }

    /// Adopt a new sample rate. Clears the capture and forgets the
    /// transport position.
    pub fn prepare(&self, sample_rate: f64) -> Result<(), SetupError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SetupError::InvalidSampleRate(sample_rate));
        }

        let mut state = self.state.lock();
        if state.sample_rate != sample_rate {
            log::debug!("scope sample rate {} -> {}", state.sample_rate, sample_rate);
        }
        state.sample_rate = sample_rate;
        state.sync.reset();
        state.clear();
        Ok(())
    }

    /// Zero everything and start a new measure.
    pub fn reset(&self) {
        self.state.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Samples written into the current measure (capped at capacity).
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// Samples pushed this measure, including those dropped at capacity.
    pub fn samples_in_measure(&self) -> u64 {
        self.state.lock().samples_in_measure
    }

    pub fn expected_samples_per_measure(&self) -> usize {
        self.state.lock().expected_samples(self.capacity)
    }

    pub fn quarter_notes_per_bar(&self) -> f64 {
        self.state.lock().sync.quarter_notes_per_bar()
    }

    /// Musical position where the current capture began.
    pub fn measure_start(&self) -> f64 {
        self.state.lock().sync.measure_start()
    }

    /// Copy the written part of the capture into `snapshot`. This is the
    /// only work the display side does while holding the lock.
    pub fn snapshot_into(&self, snapshot: &mut ScopeSnapshot) {
        snapshot.ensure_shape(self.capacity, self.lane_count);

        let state = self.state.lock();
        let cursor = state.cursor;
        snapshot.mono[..cursor].copy_from_slice(&state.mono[..cursor]);
        for (dst, src) in snapshot.lanes.iter_mut().zip(state.lanes.iter()) {
            dst[..cursor].copy_from_slice(&src[..cursor]);
        }
        snapshot.cursor = cursor;
        snapshot.expected = state.expected_samples(self.capacity);
        snapshot.quarter_notes_per_bar = state.sync.quarter_notes_per_bar();
    }

    /// Snapshot and downsample in one go. Allocates; meant for tests and
    /// one-off consumers. Use a [`ScopeReader`](super::ScopeReader) for
    /// repeated refreshes.
    pub fn downsample(&self, width: usize) -> DisplayFrame {
        let mut snapshot = ScopeSnapshot::new(self.capacity, self.lane_count);
        self.snapshot_into(&mut snapshot);

        let mut frame = DisplayFrame::new(width, self.lane_count);
        downsample_into(&snapshot, width, &mut frame);
        frame
    }
}

impl ScopeDataSink for ScopeBuffer {
    fn push_audio(&self, samples: &[f32]) {
        let mut state = self.state.lock();
        let start = state.cursor;
        let written = samples.len().min(self.capacity - start);

        state.mono[start..start + written].copy_from_slice(&samples[..written]);
        state.last_push_start = start;
        state.cursor = start + written;
        state.high_water = state.high_water.max(state.cursor);
        state.samples_in_measure += samples.len() as u64;
    }

    fn push_envelope(&self, samples: &[f32], lane: usize) {
        if lane >= self.lane_count {
            return;
        }

        let mut state = self.state.lock();
        let start = state.last_push_start;
        let written = samples.len().min(self.capacity - start);

        let dst = &mut state.lanes[lane][start..start + written];
        for (out, &value) in dst.iter_mut().zip(samples) {
            *out = value.clamp(0.0, 1.0);
        }
        state.high_water = state.high_water.max(start + written);
    }

    fn update_transport(&self, snapshot: &TransportSnapshot) {
        let mut state = self.state.lock();
        if state.sync.update(snapshot).is_reset() {
            state.clear();
        }
    }
}

/// Display-side copy of a [`ScopeBuffer`].
#[derive(Debug, Clone, Default)]
pub struct ScopeSnapshot {
    pub(crate) mono: Vec<f32>,
    pub(crate) lanes: Vec<Vec<f32>>,
    pub(crate) cursor: usize,
    pub(crate) expected: usize,
    pub(crate) quarter_notes_per_bar: f64,
}

impl ScopeSnapshot {
    pub fn new(capacity: usize, lane_count: usize) -> Self {
        let mut snapshot = Self::default();
        snapshot.ensure_shape(capacity, lane_count);
        snapshot
    }

    fn ensure_shape(&mut self, capacity: usize, lane_count: usize) {
        if self.mono.len() != capacity {
            self.mono.resize(capacity, 0.0);
        }
        self.lanes.resize_with(lane_count, Vec::new);
        for lane in self.lanes.iter_mut() {
            if lane.len() != capacity {
                lane.resize(capacity, 0.0);
            }
        }
    }

    /// Written part of the mono capture.
    pub fn audio(&self) -> &[f32] {
        &self.mono[..self.cursor]
    }

    /// Written part of one lane's envelope capture.
    pub fn envelope(&self, lane: usize) -> Option<&[f32]> {
        self.lanes.get(lane).map(|l| &l[..self.cursor])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn expected_samples(&self) -> usize {
        self.expected
    }

    pub fn quarter_notes_per_bar(&self) -> f64 {
        self.quarter_notes_per_bar
    }
}
