//! Error types for setup-time failures.
//!
//! Nothing on the audio path returns these. Out-of-range values there are
//! clamped instead; see the individual components.

use thiserror::Error;

/// Failure while preparing the engine or its scope buffers.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("lane count must be between 1 and {max}, got {requested}")]
    InvalidLaneCount { requested: usize, max: usize },

    #[error("block size must be between 1 and {max}, got {requested}")]
    InvalidBlockSize { requested: usize, max: usize },

    #[error("failed to allocate {samples} samples for {what}")]
    Allocation { what: &'static str, samples: usize },
}

/// Failure while resolving a named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown parameter id `{0}`")]
    UnknownId(String),

    #[error("lane {lane} is out of range (1..={max})")]
    LaneOutOfRange { lane: usize, max: usize },

    #[error("step {step} is out of range (0..{max})")]
    StepOutOfRange { step: usize, max: usize },
}

/// Allocate a zeroed sample buffer, reporting allocation failure instead of
/// aborting.
pub(crate) fn try_zeroed(what: &'static str, samples: usize) -> Result<Vec<f32>, SetupError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(samples)
        .map_err(|_| SetupError::Allocation { what, samples })?;
    buffer.resize(samples, 0.0);
    Ok(buffer)
}
