use std::sync::Arc;

use super::buffer::{ScopeBuffer, ScopeSnapshot};
use crate::sequencing::TimeSignature;

/*
Downsampling
============

A bar holds tens of thousands of samples; the display is a few hundred
columns wide. Column `x` of a `width`-wide display covers the sample range

    [x / width * expected, (x + 1) / width * expected)

(at least one sample), where `expected` is the projected bar length.

  waveform   One sample per column, taken at the start of the range. Columns
             past the cursor read 0 so the unplayed part of the bar is flat.

  envelope   Peak over the range, clamped to what has been written. A 1 ms
             attack is a handful of samples and would fall between columns if
             we point-sampled; peak-hold keeps every hit visible.

Presentation smoothing (optional, envelopes only) then rounds off the stair
steps peak-hold leaves behind:

    interior     [1, 4, 6, 4, 1] / 16
    near edge    [1, 2, 1] / 4
    boundary     unchanged
*/

/// One refresh worth of display columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayFrame {
    waveform: Vec<f32>,
    envelopes: Vec<Vec<f32>>,
    grid_divisions: u32,
}

impl DisplayFrame {
    pub fn new(width: usize, lane_count: usize) -> Self {
        let mut frame = Self::default();
        frame.resize(width, lane_count);
        frame.grid_divisions = TimeSignature::FOUR_FOUR.eighth_notes_per_bar();
        frame
    }

    fn resize(&mut self, width: usize, lane_count: usize) {
        self.waveform.resize(width, 0.0);
        self.envelopes.resize_with(lane_count, Vec::new);
        for envelope in self.envelopes.iter_mut() {
            envelope.resize(width, 0.0);
        }
    }

    pub fn width(&self) -> usize {
        self.waveform.len()
    }

    pub fn waveform(&self) -> &[f32] {
        &self.waveform
    }

    pub fn envelope(&self, lane: usize) -> Option<&[f32]> {
        self.envelopes.get(lane).map(Vec::as_slice)
    }

    pub fn envelopes(&self) -> &[Vec<f32>] {
        &self.envelopes
    }

    /// Eighth-note subdivisions across the bar.
    pub fn grid_divisions(&self) -> u32 {
        self.grid_divisions
    }

    /// Vertical grid lines as (fraction of width, kind), bar lines included
    /// at both ends.
    pub fn grid_lines(&self) -> impl Iterator<Item = (f32, GridLine)> + '_ {
        let divisions = self.grid_divisions.max(1);
        (0..=divisions).map(move |i| {
            let kind = if i == 0 || i == divisions {
                GridLine::Measure
            } else if i % 2 == 0 {
                GridLine::Quarter
            } else {
                GridLine::Eighth
            };
            (i as f32 / divisions as f32, kind)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLine {
    Measure,
    Quarter,
    Eighth,
}

/// Fill `frame` with `width` columns from `snapshot`.
pub fn downsample_into(snapshot: &ScopeSnapshot, width: usize, frame: &mut DisplayFrame) {
    frame.resize(width, snapshot.lanes.len());
    frame.grid_divisions = TimeSignature::eighth_notes_in(snapshot.quarter_notes_per_bar);

    let cursor = snapshot.cursor;
    if cursor == 0 || width == 0 {
        frame.waveform.fill(0.0);
        for envelope in frame.envelopes.iter_mut() {
            envelope.fill(0.0);
        }
        return;
    }

    let expected = snapshot.expected.max(1) as f64;
    let width_f = width as f64;

    for x in 0..width {
        let start = (x as f64 / width_f * expected) as usize;
        let mut end = ((x + 1) as f64 / width_f * expected) as usize;
        if end <= start {
            end = start + 1;
        }

        frame.waveform[x] = if start < cursor { snapshot.mono[start] } else { 0.0 };

        let start = start.min(cursor);
        let end = end.min(cursor);
        for (column, lane) in frame.envelopes.iter_mut().zip(snapshot.lanes.iter()) {
            column[x] = lane[start..end].iter().fold(0.0f32, |peak, &v| peak.max(v));
        }
    }
}

/// Binomial presentation smoothing, in place. `scratch` holds a copy of the
/// input.
pub fn smooth(values: &mut [f32], scratch: &mut Vec<f32>) {
    let n = values.len();
    if n < 3 {
        return;
    }

    scratch.clear();
    scratch.extend_from_slice(values);
    let src = scratch.as_slice();

    for i in 1..n - 1 {
        values[i] = if i >= 2 && i + 2 < n {
            (src[i - 2] + 4.0 * src[i - 1] + 6.0 * src[i] + 4.0 * src[i + 1] + src[i + 2]) / 16.0
        } else {
            (src[i - 1] + 2.0 * src[i] + src[i + 1]) / 4.0
        };
    }
}

/// Display-thread side of a [`ScopeBuffer`].
///
/// Owns its snapshot and frame so a refresh holds the scope lock only for a
/// copy; downsampling and smoothing happen after it is released.
pub struct ScopeReader {
    buffer: Arc<ScopeBuffer>,
    snapshot: ScopeSnapshot,
    frame: DisplayFrame,
    scratch: Vec<f32>,
    smoothing: bool,
}

impl ScopeReader {
    pub fn new(buffer: Arc<ScopeBuffer>) -> Self {
        let snapshot = ScopeSnapshot::new(buffer.capacity(), buffer.lane_count());
        let frame = DisplayFrame::new(0, buffer.lane_count());
        Self {
            buffer,
            snapshot,
            frame,
            scratch: Vec::new(),
            smoothing: true,
        }
    }

    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Pull the latest capture and rebuild the frame at `width` columns.
    pub fn refresh(&mut self, width: usize) -> &DisplayFrame {
        self.buffer.snapshot_into(&mut self.snapshot);
        downsample_into(&self.snapshot, width, &mut self.frame);

        if self.smoothing {
            for envelope in self.frame.envelopes.iter_mut() {
                smooth(envelope, &mut self.scratch);
            }
        }

        &self.frame
    }

    /// The frame built by the last `refresh`.
    pub fn frame(&self) -> &DisplayFrame {
        &self.frame
    }

    pub fn buffer(&self) -> &Arc<ScopeBuffer> {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeDataSink;
    use crate::sequencing::TransportSnapshot;

    fn snapshot_with(mono: Vec<f32>, lanes: Vec<Vec<f32>>, expected: usize) -> ScopeSnapshot {
        ScopeSnapshot {
            cursor: mono.len(),
            mono,
            lanes,
            expected,
            quarter_notes_per_bar: 4.0,
        }
    }

    #[test]
    fn width_is_exact() {
        let snapshot = snapshot_with(vec![0.5; 1000], vec![vec![0.5; 1000]], 1000);
        let mut frame = DisplayFrame::default();
        for width in [1, 7, 300, 999, 1000, 1500] {
            downsample_into(&snapshot, width, &mut frame);
            assert_eq!(frame.width(), width);
            assert_eq!(frame.envelope(0).unwrap().len(), width);
        }
    }

    #[test]
    fn empty_capture_is_all_zero() {
        let snapshot = ScopeSnapshot::new(128, 2);
        let mut frame = DisplayFrame::new(32, 2);
        downsample_into(&snapshot, 32, &mut frame);
        assert!(frame.waveform().iter().all(|&s| s == 0.0));
        assert!(frame.envelopes().iter().flatten().all(|&e| e == 0.0));
    }

    #[test]
    fn envelope_columns_hold_the_peak() {
        // A one-sample spike inside a 100-sample column must survive
        let mut env = vec![0.0; 1000];
        env[537] = 0.9;
        let snapshot = snapshot_with(vec![0.0; 1000], vec![env.clone()], 1000);

        let mut frame = DisplayFrame::default();
        downsample_into(&snapshot, 10, &mut frame);
        let columns = frame.envelope(0).unwrap();

        assert_eq!(columns[5], 0.9);
        for (x, &column) in columns.iter().enumerate() {
            let range = &env[x * 100..(x + 1) * 100];
            let peak = range.iter().fold(0.0f32, |p, &v| p.max(v));
            assert_eq!(column, peak);
        }
    }

    #[test]
    fn unplayed_part_of_bar_is_flat() {
        // Half the bar written
        let snapshot = snapshot_with(vec![0.5; 500], vec![vec![1.0; 500]], 1000);
        let mut frame = DisplayFrame::default();
        downsample_into(&snapshot, 10, &mut frame);

        assert!(frame.waveform()[..5].iter().all(|&s| s == 0.5));
        assert!(frame.waveform()[5..].iter().all(|&s| s == 0.0));
        assert!(frame.envelope(0).unwrap()[5..].iter().all(|&e| e == 0.0));
    }

    #[test]
    fn waveform_point_samples_column_start() {
        let mono: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let snapshot = snapshot_with(mono, vec![vec![0.0; 100]], 100);
        let mut frame = DisplayFrame::default();
        downsample_into(&snapshot, 4, &mut frame);
        assert_eq!(frame.waveform(), &[0.0, 25.0, 50.0, 75.0]);
    }

    #[test]
    fn wider_than_bar_repeats_samples() {
        let snapshot = snapshot_with(vec![0.25; 10], vec![vec![0.5; 10]], 10);
        let mut frame = DisplayFrame::default();
        downsample_into(&snapshot, 40, &mut frame);
        assert!(frame.envelope(0).unwrap().iter().all(|&e| e == 0.5));
        assert!(frame.waveform().iter().all(|&s| s == 0.25));
    }

    #[test]
    fn smoothing_kernels() {
        let mut values = vec![0.0, 0.0, 0.0, 16.0, 0.0, 0.0, 0.0];
        let mut scratch = Vec::new();
        smooth(&mut values, &mut scratch);

        // Boundaries untouched, near-edge use the 3-tap kernel
        assert_eq!(values[0], 0.0);
        assert_eq!(values[6], 0.0);
        assert_eq!(values[1], 0.0);
        assert_eq!(values[2], 4.0);
        assert_eq!(values[3], 6.0);
        assert_eq!(values[4], 4.0);

        let mut edge = vec![0.0, 8.0, 0.0];
        smooth(&mut edge, &mut scratch);
        assert_eq!(edge, vec![0.0, 4.0, 0.0]);
    }

    #[test]
    fn smoothing_preserves_flat_lines() {
        let mut values = vec![0.5; 20];
        let mut scratch = Vec::new();
        smooth(&mut values, &mut scratch);
        assert!(values.iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn grid_follows_meter() {
        let mut snapshot = snapshot_with(vec![0.0; 10], vec![vec![0.0; 10]], 10);
        snapshot.quarter_notes_per_bar = 3.0;
        let mut frame = DisplayFrame::default();
        downsample_into(&snapshot, 10, &mut frame);

        assert_eq!(frame.grid_divisions(), 6);
        let lines: Vec<_> = frame.grid_lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], (0.0, GridLine::Measure));
        assert_eq!(lines[1].1, GridLine::Eighth);
        assert_eq!(lines[2].1, GridLine::Quarter);
        assert_eq!(lines[6], (1.0, GridLine::Measure));
    }

    #[test]
    fn grid_matches_time_signature_rounding() {
        let mut snapshot = snapshot_with(vec![0.0; 10], vec![vec![0.0; 10]], 10);
        let five_sixteen = TimeSignature::new(5, 16);
        snapshot.quarter_notes_per_bar = five_sixteen.quarter_notes_per_bar();
        let mut frame = DisplayFrame::default();
        downsample_into(&snapshot, 10, &mut frame);

        assert_eq!(frame.grid_divisions(), five_sixteen.eighth_notes_per_bar());
        assert_eq!(frame.grid_divisions(), 3);
    }

    #[test]
    fn reader_refreshes_from_shared_buffer() {
        let buffer = Arc::new(ScopeBuffer::new(1_000, 1, 48_000.0).unwrap());
        let mut reader = ScopeReader::new(Arc::clone(&buffer)).with_smoothing(false);

        buffer.update_transport(&TransportSnapshot::playing(0.0, 120.0));
        buffer.push_audio(&[0.5; 1_000]);
        buffer.push_envelope(&[1.0; 1_000], 0);

        let frame = reader.refresh(50);
        assert_eq!(frame.width(), 50);
        // The 96 000-sample bar is clamped to capacity, so the capture fills it
        assert!(frame.envelope(0).unwrap().iter().all(|&e| e == 1.0));
        assert_eq!(reader.frame().waveform()[0], 0.5);
    }
}
