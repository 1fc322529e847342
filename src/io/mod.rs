// Purpose - format conversions at the edges of the engine

pub mod converter;

pub use converter::{db_to_gain, gain_to_db, interleave, mono_mix};
