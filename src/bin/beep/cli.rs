use beep::{io::DEFAULT_DEVICE, ToneSettings, Waveform};
use clap::Parser;

/// Play a tone on the sound card.
#[derive(Parser, Debug)]
#[command(name = "beep", version, long_about = None)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Set frequency to N Hz
    #[arg(long = "freq", value_name = "N", default_value_t = 440.0, allow_negative_numbers = true)]
    pub frequency: f32,

    /// Set volume to N. WARNING: do use SMALL values!
    #[arg(long = "vol", value_name = "N", default_value_t = 0.03, allow_negative_numbers = true)]
    pub volume: f32,

    /// Set duration to N seconds, in steps of 0.1s
    #[arg(long = "dur", value_name = "N", default_value_t = 1.0, allow_negative_numbers = true)]
    pub duration: f32,

    /// Use a sine wave (default)
    #[arg(long, overrides_with_all = ["square", "saw", "triangle"])]
    pub sine: bool,

    /// Use a square wave
    #[arg(long, overrides_with_all = ["sine", "saw", "triangle"])]
    pub square: bool,

    /// Use a saw wave
    #[arg(long, overrides_with_all = ["sine", "square", "triangle"])]
    pub saw: bool,

    /// Use a triangle wave
    #[arg(long, overrides_with_all = ["sine", "square", "saw"])]
    pub triangle: bool,

    /// Output device ("default" or part of a device name)
    #[arg(long, value_name = "NAME", default_value = DEFAULT_DEVICE)]
    pub device: String,
}

impl Cli {
    /// The selected waveform. The flags override each other, so at most one
    /// is set.
    pub fn waveform(&self) -> Waveform {
        if self.square {
            Waveform::Square
        } else if self.saw {
            Waveform::Saw
        } else if self.triangle {
            Waveform::Triangle
        } else {
            Waveform::Sine
        }
    }

    pub fn tone_settings(&self) -> ToneSettings {
        ToneSettings::new()
            .frequency(self.frequency)
            .volume(self.volume)
            .duration(self.duration)
            .waveform(self.waveform())
    }
}
