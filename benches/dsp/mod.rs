//! Benchmarks for block generation.

mod oscillator;

pub use oscillator::bench_oscillator;
