//! Measure-synchronized capture for visualization.
//!
//! The audio thread writes through [`ScopeDataSink`]; a display thread reads
//! through [`ScopeReader`], which copies out under the lock and downsamples
//! into its own buffers.

pub mod buffer;
pub mod display;
pub mod sink;

pub use buffer::{ScopeBuffer, ScopeSnapshot, DEFAULT_SCOPE_CAPACITY};
pub use display::{DisplayFrame, GridLine, ScopeReader};
pub use sink::ScopeDataSink;
