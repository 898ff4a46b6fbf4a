//! Blocking audio output on top of a `cpal` callback stream.
//!
//! `cpal` pulls samples from a realtime callback, while the tone loop wants to
//! push whole blocks and block until the device has room. An `rtrb` ring sits
//! between the two: the caller's thread is the only producer, the audio
//! callback is the only consumer, and neither side ever takes a lock on the
//! hot path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedBufferSize,
    SupportedStreamConfigRange,
};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{io::BlockSink, BLOCK_SIZE, SAMPLE_RATE};

/// Device name that selects the host's default output device.
pub const DEFAULT_DEVICE: &str = "default";

/// Requested device period in frames (10ms at 48kHz).
pub const PERIOD_FRAMES: u32 = SAMPLE_RATE / 100;

/// Blocks of headroom in the ring between the writer and the callback.
const RING_BLOCKS: usize = 2;

/// How long `write`/`drain` tolerate a callback that makes no progress.
const STALL_TIMEOUT: Duration = Duration::from_secs(2);

type ErrorSlot = Arc<Mutex<Option<cpal::StreamError>>>;

/// Counters published by the audio callback, read by the writer.
#[derive(Debug, Default)]
struct Progress {
    /// Frames handed to the device so far, silence included.
    emitted: AtomicU64,
    /// Samples taken out of the ring so far.
    consumed: AtomicU64,
    /// `emitted` position just past the most recent ring sample.
    queued_end: AtomicU64,
    /// Callback-to-playback delay reported by the last callback, in frames.
    latency: AtomicU64,
}

/// Producer half: the blocking side used by the tone loop.
pub struct RingWriter {
    producer: Producer<f32>,
    progress: Arc<Progress>,
    stream_error: ErrorSlot,
    written: u64,
    poll_interval: Duration,
    stall_timeout: Duration,
}

/// Consumer half: lives inside the realtime callback. Never blocks.
pub struct RingReader {
    consumer: Consumer<f32>,
    progress: Arc<Progress>,
}

/// Create a connected writer/reader pair holding up to `capacity` samples.
pub fn ring(capacity: usize) -> (RingWriter, RingReader) {
    let (producer, consumer) = RingBuffer::<f32>::new(capacity);
    let progress = Arc::new(Progress::default());

    let writer = RingWriter {
        producer,
        progress: progress.clone(),
        stream_error: Arc::new(Mutex::new(None)),
        written: 0,
        poll_interval: Duration::from_millis(1),
        stall_timeout: STALL_TIMEOUT,
    };
    (writer, RingReader { consumer, progress })
}

/// Fails once a watched counter has not moved for longer than the timeout.
struct StallWatch {
    last: u64,
    since: Instant,
    timeout: Duration,
}

impl StallWatch {
    fn new(value: u64, timeout: Duration) -> Self {
        Self {
            last: value,
            since: Instant::now(),
            timeout,
        }
    }

    fn observe(&mut self, value: u64) -> Result<()> {
        if value != self.last {
            self.last = value;
            self.since = Instant::now();
        } else if self.since.elapsed() > self.timeout {
            return Err(eyre!(
                "audio device stopped consuming samples for {:?}",
                self.timeout
            ));
        }
        Ok(())
    }
}

impl RingWriter {
    pub fn with_timing(mut self, poll_interval: Duration, stall_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.stall_timeout = stall_timeout;
        self
    }

    /// Samples accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Fail if the stream has reported an error since the last check.
    fn check_stream(&self) -> Result<()> {
        let mut slot = self
            .stream_error
            .lock()
            .map_err(|_| eyre!("audio error slot poisoned"))?;
        match slot.take() {
            Some(err) => Err(eyre!(err).wrap_err("audio output stream failed")),
            None => Ok(()),
        }
    }
}

impl BlockSink for RingWriter {
    fn write(&mut self, block: &[f32]) -> Result<usize> {
        let mut written = 0;
        let mut watch = StallWatch::new(
            self.progress.consumed.load(Ordering::Acquire),
            self.stall_timeout,
        );

        while written < block.len() {
            self.check_stream()?;

            let free = self.producer.slots().min(block.len() - written);
            if free == 0 {
                watch.observe(self.progress.consumed.load(Ordering::Acquire))?;
                thread::sleep(self.poll_interval);
                continue;
            }

            let chunk = self
                .producer
                .write_chunk_uninit(free)
                .wrap_err("audio ring buffer rejected write")?;
            written += chunk.fill_from_iter(block[written..].iter().copied());
        }

        self.written += written as u64;
        log::trace!("queued {written} samples");
        Ok(written)
    }

    /// Returns once every written sample has left the ring and the device
    /// has emitted as many further frames as its reported latency.
    fn drain(&mut self) -> Result<()> {
        let progress = &self.progress;

        let mut watch =
            StallWatch::new(progress.consumed.load(Ordering::Acquire), self.stall_timeout);
        loop {
            self.check_stream()?;
            let consumed = progress.consumed.load(Ordering::Acquire);
            if consumed >= self.written {
                break;
            }
            watch.observe(consumed)?;
            thread::sleep(self.poll_interval);
        }

        if self.written > 0 {
            let target = progress.queued_end.load(Ordering::Acquire)
                + progress.latency.load(Ordering::Acquire);
            let mut watch =
                StallWatch::new(progress.emitted.load(Ordering::Acquire), self.stall_timeout);
            loop {
                self.check_stream()?;
                let emitted = progress.emitted.load(Ordering::Acquire);
                if emitted >= target {
                    break;
                }
                watch.observe(emitted)?;
                thread::sleep(self.poll_interval);
            }
        }

        self.check_stream()?;
        log::debug!("output drained after {} samples", self.written);
        Ok(())
    }
}

impl RingReader {
    /// Fill an interleaved device buffer: mono to every channel, silence on
    /// underrun. `latency` is the delay from this callback until `data`
    /// starts playing, when the backend reports one.
    pub fn render(&mut self, data: &mut [f32], channels: usize, latency: Option<Duration>) {
        let start = self.progress.emitted.load(Ordering::Relaxed);
        let mut frames = 0u64;
        let mut popped = 0u64;
        let mut last_end = None;

        for frame in data.chunks_mut(channels.max(1)) {
            frames += 1;
            match self.consumer.pop() {
                Ok(sample) => {
                    frame.fill(sample);
                    popped += 1;
                    last_end = Some(start + frames);
                }
                Err(_) => frame.fill(0.0),
            }
        }

        if let Some(latency) = latency {
            let nanos = latency.as_nanos() * u128::from(SAMPLE_RATE);
            let latency_frames = nanos.div_ceil(1_000_000_000) as u64;
            self.progress.latency.store(latency_frames, Ordering::Release);
        }
        if let Some(end) = last_end {
            self.progress.queued_end.store(end, Ordering::Release);
        }
        self.progress.consumed.fetch_add(popped, Ordering::Release);
        self.progress.emitted.store(start + frames, Ordering::Release);
    }
}

/// An open, playing mono output stream.
///
/// Dropping it stops and closes the stream.
pub struct AudioOutput {
    writer: RingWriter,
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Open `device_name` for 32-bit float playback at 48kHz.
    ///
    /// `"default"` picks the host default device. Anything else picks the
    /// first output device whose name contains it.
    pub fn open(device_name: &str) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_device(&host, device_name)?;
        let name = device.name().unwrap_or_else(|_| String::from("<unnamed>"));

        let ranges = device
            .supported_output_configs()
            .wrap_err_with(|| format!("failed to query output configs of '{name}'"))?;
        let config = choose_config(ranges).ok_or_else(|| {
            eyre!("output device '{name}' does not support 32-bit float at {SAMPLE_RATE} Hz")
        })?;

        log::info!(
            "opened '{}' ({} channel(s), {} Hz, buffer {:?})",
            name,
            config.channels,
            config.sample_rate.0,
            config.buffer_size
        );

        let (writer, reader) = ring(BLOCK_SIZE * RING_BLOCKS);

        let period_frames = match config.buffer_size {
            BufferSize::Fixed(frames) => frames,
            BufferSize::Default => PERIOD_FRAMES,
        };
        let period = Duration::from_secs_f64(f64::from(period_frames) / f64::from(SAMPLE_RATE));
        let writer = writer.with_timing(period / 4, STALL_TIMEOUT);

        let stream = build_stream(&device, &config, reader, writer.stream_error.clone())
            .wrap_err_with(|| format!("failed to build output stream on '{name}'"))?;
        stream
            .play()
            .wrap_err_with(|| format!("failed to start output stream on '{name}'"))?;

        Ok(Self {
            writer,
            _stream: stream,
        })
    }
}

impl BlockSink for AudioOutput {
    fn write(&mut self, block: &[f32]) -> Result<usize> {
        self.writer.write(block)
    }

    fn drain(&mut self) -> Result<()> {
        self.writer.drain()
    }
}

fn find_device(host: &cpal::Host, name: &str) -> Result<cpal::Device> {
    if name == DEFAULT_DEVICE {
        return host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"));
    }

    host.output_devices()
        .wrap_err("failed to enumerate output devices")?
        .find(|device| {
            device
                .name()
                .map(|device_name| device_name.contains(name))
                .unwrap_or(false)
        })
        .ok_or_else(|| eyre!("no output device matching '{name}'"))
}

/// Pick a 32-bit float, 48kHz configuration, preferring the fewest channels.
///
/// A fixed 10ms buffer is requested when the device advertises a range that
/// contains it; otherwise the device default is used.
pub fn choose_config<I>(ranges: I) -> Option<StreamConfig>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let rate = SampleRate(SAMPLE_RATE);

    let range = ranges
        .into_iter()
        .filter(|range| range.sample_format() == SampleFormat::F32)
        .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
        .filter(|range| range.channels() > 0)
        .min_by_key(|range| range.channels())?;

    let buffer_size = match *range.buffer_size() {
        SupportedBufferSize::Range { min, max } if (min..=max).contains(&PERIOD_FRAMES) => {
            BufferSize::Fixed(PERIOD_FRAMES)
        }
        _ => BufferSize::Default,
    };

    Some(StreamConfig {
        channels: range.channels(),
        sample_rate: rate,
        buffer_size,
    })
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut reader: RingReader,
    stream_error: ErrorSlot,
) -> Result<cpal::Stream> {
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], info: &cpal::OutputCallbackInfo| {
            let timestamp = info.timestamp();
            let latency = timestamp.playback.duration_since(&timestamp.callback);
            reader.render(data, channels, latency);
        },
        move |err| {
            log::error!("audio stream error: {err}");
            // Keep the first error; later ones are usually fallout from it.
            if let Ok(mut slot) = stream_error.lock() {
                if slot.is_none() {
                    *slot = Some(err);
                }
            }
        },
        None,
    )?;

    Ok(stream)
}
