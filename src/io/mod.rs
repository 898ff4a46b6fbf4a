// Purpose - where generated blocks go

use color_eyre::eyre::Result;

#[cfg(feature = "rtrb")]
pub mod output;

#[cfg(feature = "rtrb")]
pub use output::{ring, AudioOutput, RingReader, RingWriter, DEFAULT_DEVICE};

/// Destination for generated sample blocks.
pub trait BlockSink {
    /// Queue a block for playback, blocking until all of it is accepted.
    /// Returns the number of samples written.
    fn write(&mut self, block: &[f32]) -> Result<usize>;

    /// Wait until everything written so far has been played.
    fn drain(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory capture, handy for tests and offline inspection.
impl BlockSink for Vec<f32> {
    fn write(&mut self, block: &[f32]) -> Result<usize> {
        self.extend_from_slice(block);
        Ok(block.len())
    }
}

impl<S: BlockSink + ?Sized> BlockSink for &mut S {
    fn write(&mut self, block: &[f32]) -> Result<usize> {
        (**self).write(block)
    }

    fn drain(&mut self) -> Result<()> {
        (**self).drain()
    }
}
