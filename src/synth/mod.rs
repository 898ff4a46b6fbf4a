//! Block synthesis: the generator state and the loop that feeds a sink.

/// Absolute-clock block generator.
pub mod state;
/// Fixed-duration tone settings and playback loop.
pub mod tone;

pub use state::SynthState;
pub use tone::{play, ToneSettings};
