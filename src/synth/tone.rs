#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use color_eyre::eyre::{Result, WrapErr};

use crate::{dsp::oscillator::Waveform, io::BlockSink, synth::SynthState, BLOCKS_PER_SECOND};

/// What to play: one waveform at a fixed pitch and level for a fixed time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSettings {
    /// Hz
    pub frequency: f32,
    /// Linear amplitude. Keep it small.
    pub volume: f32,
    /// Seconds; truncated to whole blocks (tenths of a second).
    pub duration: f32,
    pub waveform: Waveform,
}

impl ToneSettings {
    pub fn new() -> Self {
        Self {
            frequency: 440.0,
            volume: 0.03,
            duration: 1.0,
            waveform: Waveform::Sine,
        }
    }

    pub fn frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Number of 0.1s blocks to play.
    ///
    /// Truncates rather than rounds, so 0.25s plays two blocks. Negative and
    /// NaN durations play nothing.
    pub fn block_count(&self) -> usize {
        (self.duration * BLOCKS_PER_SECOND as f32) as usize
    }

    /// Fresh generator state for these settings.
    pub fn synth_state(&self) -> SynthState {
        SynthState::new(self.frequency, self.volume)
    }
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate `settings.block_count()` blocks into `sink`, then drain it.
///
/// Stops at the first sink error. Returns the number of samples written.
pub fn play<S: BlockSink>(settings: &ToneSettings, mut sink: S) -> Result<usize> {
    let blocks = settings.block_count();
    let mut state = settings.synth_state();
    let mut written = 0;

    log::info!(
        "playing {} at {} Hz, volume {}, {} block(s)",
        settings.waveform,
        settings.frequency,
        settings.volume,
        blocks
    );

    for block in 0..blocks {
        state.generate(settings.waveform);
        written += sink
            .write(state.buffer())
            .wrap_err_with(|| format!("failed to write block {block} of {blocks}"))?;
    }

    sink.drain().wrap_err("failed to drain output")?;
    log::debug!("wrote {written} samples");

    Ok(written)
}
