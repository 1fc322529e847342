pub mod dsp; // Envelope, filter and modulation primitives
pub mod engine; // Per-block processor wiring lanes, filter and scope together
pub mod error;
pub mod io;
pub mod params;
pub mod scope; // Measure-synced capture for visualization
pub mod sequencing; // Host transport, rates and step sequencing

pub use engine::{EngineConfig, EnvGenEngine, StepIndicator};
pub use error::{ParamError, SetupError};
pub use params::{EngineParams, LaneConfig, ParameterStore};
pub use scope::{ScopeBuffer, ScopeDataSink, ScopeReader};
pub use sequencing::TransportSnapshot;

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Steps in every lane's gate pattern.
pub const NUM_STEPS: usize = 16;
/// Upper bound on configurable lanes.
pub const MAX_LANES: usize = 8;
/// Channels that carry filter state. Further channels pass through unfiltered.
pub const MAX_FILTER_CHANNELS: usize = 2;
pub(crate) const MIN_TIME: f32 = 0.001;
