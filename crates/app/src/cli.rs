//! Command-line argument parsing.

use std::path::PathBuf;

use binaural_core::controls::percent_to_fraction;
use binaural_core::{Controls, NoiseType};
use clap::Parser;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "binaural")]
#[command(about = "Binaural beat generator with background noise", long_about = None)]
pub struct Args {
    /// Left-ear carrier frequency
    #[arg(long, value_name = "HZ")]
    pub base: Option<f32>,

    /// Difference between the right and left ear
    #[arg(long, value_name = "HZ")]
    pub beat: Option<f32>,

    /// Tone volume in percent
    #[arg(long, value_name = "PERCENT")]
    pub volume: Option<f32>,

    /// Background noise: none, white, pink, brown
    #[arg(long, value_name = "TYPE")]
    pub noise: Option<NoiseType>,

    /// Noise volume in percent
    #[arg(long, value_name = "PERCENT")]
    pub noise_volume: Option<f32>,

    /// Sweep the noise between the ears
    #[arg(long)]
    pub pan: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Render to a WAV file instead of playing
    #[arg(long, value_name = "WAV")]
    pub render: Option<PathBuf>,

    /// Length of the rendered file
    #[arg(long, value_name = "SECONDS", default_value = "60")]
    pub seconds: f64,

    /// Sample rate of the rendered file
    #[arg(long, value_name = "HZ", default_value = "44100")]
    pub sample_rate: u32,
}

impl Args {
    /// Layer the flags that were given over the configured values.
    pub fn apply_overrides(&self, controls: &mut Controls) {
        if let Some(base) = self.base {
            controls.tone.base_frequency_hz = base;
        }
        if let Some(beat) = self.beat {
            controls.tone.beat_frequency_hz = beat;
        }
        if let Some(volume) = self.volume {
            controls.tone.volume = percent_to_fraction(volume);
        }
        if let Some(noise) = self.noise {
            controls.noise.noise_type = noise;
        }
        if let Some(volume) = self.noise_volume {
            controls.noise.volume = percent_to_fraction(volume);
        }
        if self.pan {
            controls.noise.pan_enabled = true;
        }
    }
}
