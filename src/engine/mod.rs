//! Wires lanes, modulation, filter and scope into one block processor.

pub mod config;
pub mod lane;
pub mod processor;

pub use config::EngineConfig;
pub use lane::Lane;
pub use processor::{EnvGenEngine, StepIndicator};
