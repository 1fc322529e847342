#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::DEFAULT_SMOOTHING_TIME;
use crate::error::SetupError;
use crate::scope::DEFAULT_SCOPE_CAPACITY;
use crate::{MAX_BLOCK_SIZE, MAX_LANES};

/// Construction-time settings for [`EnvGenEngine`](super::EnvGenEngine).
///
/// ```
/// use envgen::EngineConfig;
///
/// let config = EngineConfig::default()
///     .sample_rate(44_100.0)
///     .lanes(4)
///     .smoothing(None);
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f64,
    /// Largest block processed in one pass. Longer host blocks are split.
    pub max_block_size: usize,
    /// Active lanes, 1..=MAX_LANES
    pub lanes: usize,
    /// Samples per scope lane, for scopes built from this config
    pub scope_capacity: usize,
    /// Envelope smoothing time constant in seconds, `None` for raw output
    pub smoothing: Option<f32>,
}

impl EngineConfig {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn scope_capacity(mut self, scope_capacity: usize) -> Self {
        self.scope_capacity = scope_capacity;
        self
    }

    pub fn smoothing(mut self, smoothing: Option<f32>) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SetupError::InvalidSampleRate(self.sample_rate));
        }
        if self.lanes == 0 || self.lanes > MAX_LANES {
            return Err(SetupError::InvalidLaneCount {
                requested: self.lanes,
                max: MAX_LANES,
            });
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(SetupError::InvalidBlockSize {
                requested: self.max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: MAX_BLOCK_SIZE,
            lanes: MAX_LANES,
            scope_capacity: DEFAULT_SCOPE_CAPACITY,
            smoothing: Some(DEFAULT_SMOOTHING_TIME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            EngineConfig::new(0.0).validate(),
            Err(SetupError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            EngineConfig::new(f64::NAN).validate(),
            Err(SetupError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            EngineConfig::default().lanes(0).validate(),
            Err(SetupError::InvalidLaneCount { requested: 0, .. })
        ));
        assert!(matches!(
            EngineConfig::default().lanes(MAX_LANES + 1).validate(),
            Err(SetupError::InvalidLaneCount { .. })
        ));
        assert!(matches!(
            EngineConfig::default().max_block_size(MAX_BLOCK_SIZE * 2).validate(),
            Err(SetupError::InvalidBlockSize { .. })
        ));
    }
}
