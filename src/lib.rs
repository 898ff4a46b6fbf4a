pub mod dsp; // Waveform math
pub mod io;
pub mod synth; // Block generation and the tone loop

pub use dsp::oscillator::Waveform;
pub use synth::{play, SynthState, ToneSettings};

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 48_000;
/// Blocks written per second of tone.
pub const BLOCKS_PER_SECOND: usize = 10;
/// Samples per generated block (0.1s at 48kHz).
pub const BLOCK_SIZE: usize = SAMPLE_RATE as usize / BLOCKS_PER_SECOND;
