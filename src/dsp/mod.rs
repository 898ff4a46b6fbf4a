//! Low-level waveform math used by the synth state.
//!
//! Everything here is a pure function of phase: no buffers, no clocks. The
//! `synth` module owns the sample cursor and turns absolute sample indices
//! into phase before calling in.

/// Periodic waveform shapes.
pub mod oscillator;

pub use oscillator::{frac, Waveform};
