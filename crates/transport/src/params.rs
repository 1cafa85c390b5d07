use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Settings of the binaural tone pair.
///
/// Values are carried as given; nothing here clamps out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneParameters {
    pub base_frequency_hz: f32,
    pub beat_frequency_hz: f32,
    /// Shared tone volume as a fraction (0.0..=1.0).
    pub volume: f32,
}

impl ToneParameters {
    /// Frequency of the left generator.
    pub fn left_hz(&self) -> f32 {
        self.base_frequency_hz
    }

    /// Frequency of the right generator, detuned by the beat frequency.
    pub fn right_hz(&self) -> f32 {
        self.base_frequency_hz + self.beat_frequency_hz
    }
}

impl Default for ToneParameters {
    fn default() -> Self {
        Self {
            base_frequency_hz: 200.0,
            beat_frequency_hz: 10.0,
            volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseType {
    #[default]
    None,
    White,
    Pink,
    Brown,
}

impl NoiseType {
    pub fn is_active(&self) -> bool {
        !matches!(self, NoiseType::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseType::None => "none",
            NoiseType::White => "white",
            NoiseType::Pink => "pink",
            NoiseType::Brown => "brown",
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown noise type '{0}' (expected none, white, pink or brown)")]
pub struct ParseNoiseTypeError(pub String);

impl FromStr for NoiseType {
    type Err = ParseNoiseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(NoiseType::None),
            "white" => Ok(NoiseType::White),
            "pink" => Ok(NoiseType::Pink),
            "brown" => Ok(NoiseType::Brown),
            _ => Err(ParseNoiseTypeError(s.to_string())),
        }
    }
}

/// Settings of the noise bed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoiseParameters {
    #[serde(rename = "type")]
    pub noise_type: NoiseType,
    /// Noise volume as a fraction (0.0..=1.0).
    pub volume: f32,
    pub pan_enabled: bool,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            noise_type: NoiseType::None,
            volume: 0.5,
            pan_enabled: false,
        }
    }
}
