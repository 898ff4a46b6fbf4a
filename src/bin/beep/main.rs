//! beep - play a short tone on the sound card
//!
//! Run with: cargo run -- --square --freq 220 --dur 0.5

mod cli;

use beep::{io::AudioOutput, play};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use cli::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = cli.tone_settings();

    let output = AudioOutput::open(&cli.device)
        .wrap_err_with(|| format!("cannot open audio device '{}'", cli.device))?;
    play(&settings, output)?;

    Ok(())
}
