//! Whole-tone benchmarks through the same loop the CLI uses.

mod tone;

pub use tone::bench_tone;
