//! Low-level DSP primitives used by the engine's lanes.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside per-lane state. They stay focused on the signal-processing
//! math; the engine layers sequencing and routing on top.

/// Attack/hold/decay envelope generator with optional output smoothing.
pub mod envelope;
/// State-variable filter with low-pass, high-pass and band-pass responses.
pub mod filter;
/// Per-destination summing of bipolar envelope modulation.
pub mod modulate;

pub use envelope::{Envelope, EnvelopeState};
pub use filter::{FilterMode, SVFilter};
pub use modulate::{Destination, ModulationMixer};
