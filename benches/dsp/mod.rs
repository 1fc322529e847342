//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod modulate;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use modulate::bench_modulate;
