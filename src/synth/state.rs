use crate::{dsp::oscillator::Waveform, BLOCK_SIZE, SAMPLE_RATE};

/// Block generator state: one reusable output buffer plus an absolute sample
/// clock.
///
/// Every sample is computed from `time_cursor + i`, so output depends only on
/// the absolute sample index and never on what the buffer held before.
#[derive(Debug, Clone)]
pub struct SynthState {
    buffer: Vec<f32>,
    time_cursor: u64,
    frequency: f32,
    volume: f32,
    sample_rate: u32,
}

impl SynthState {
    /// 48kHz state with the standard 4800-sample block.
    pub fn new(frequency: f32, volume: f32) -> Self {
        Self::with_block_size(frequency, volume, BLOCK_SIZE)
    }

    /// # Panics
    /// Panics if `block_size` is zero.
    pub fn with_block_size(frequency: f32, volume: f32, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        Self {
            buffer: vec![0.0; block_size],
            time_cursor: 0,
            frequency,
            volume,
            sample_rate: SAMPLE_RATE,
        }
    }

    /// # Panics
    /// Panics if `sample_rate` is zero.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self
    }

    /// Fill the buffer with the next block of `waveform` and advance the clock
    /// by one block.
    pub fn generate(&mut self, waveform: Waveform) {
        let start = self.time_cursor;
        let frequency = f64::from(self.frequency);
        let volume = f64::from(self.volume);
        let sample_rate = f64::from(self.sample_rate);

        for (t, slot) in (start..).zip(self.buffer.iter_mut()) {
            // Multiply before dividing so period boundaries land on exact integers.
            let cycles = t as f64 * frequency / sample_rate;
            *slot = (volume * waveform.shape(cycles)) as f32;
        }

        self.time_cursor += self.buffer.len() as u64;
    }

    /// The most recently generated block.
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    /// Samples generated so far.
    pub fn time_cursor(&self) -> u64 {
        self.time_cursor
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
