use crate::sequencing::TransportSnapshot;

/// Receives visualization data from the audio thread.
///
/// The engine calls, once per block and in this order: `update_transport`,
/// `push_audio` with the mono mix, then `push_envelope` once per lane with
/// that lane's envelope values for the same samples.
///
/// Implementations run on the audio thread. They must not allocate and
/// should hold any lock only briefly.
pub trait ScopeDataSink: Send + Sync {
    /// Append mono audio for the current measure.
    fn push_audio(&self, samples: &[f32]);

    /// Envelope values (0..1) for `lane`, aligned with the last `push_audio`.
    fn push_envelope(&self, samples: &[f32], lane: usize);

    /// Host transport for measure-boundary detection.
    fn update_transport(&self, snapshot: &TransportSnapshot);
}
