//! Benchmarks for real-world scenarios.

mod engine;
mod scope;

pub use engine::bench_engine;
pub use scope::bench_scope;
