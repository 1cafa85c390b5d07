//! External control identifiers and the cached control values.

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use binaural_transport::{NoiseParameters, NoiseType, ParseNoiseTypeError, ToneParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    BaseFrequency,
    BeatFrequency,
    Volume,
    NoiseVolume,
    NoiseType,
    PanEnabled,
}

impl ControlId {
    pub const ALL: [ControlId; 6] = [
        ControlId::BaseFrequency,
        ControlId::BeatFrequency,
        ControlId::Volume,
        ControlId::NoiseVolume,
        ControlId::NoiseType,
        ControlId::PanEnabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::BaseFrequency => "baseFrequencyHz",
            ControlId::BeatFrequency => "beatFrequencyHz",
            ControlId::Volume => "volume",
            ControlId::NoiseVolume => "noiseVolume",
            ControlId::NoiseType => "noiseType",
            ControlId::PanEnabled => "panEnabled",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlId {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseFrequencyHz" | "baseFrequency" | "base" => Ok(ControlId::BaseFrequency),
            "beatFrequencyHz" | "beatFrequency" | "beat" => Ok(ControlId::BeatFrequency),
            "volume" => Ok(ControlId::Volume),
            "noiseVolume" | "noise-volume" => Ok(ControlId::NoiseVolume),
            "noiseType" | "noise" => Ok(ControlId::NoiseType),
            "panEnabled" | "pan" => Ok(ControlId::PanEnabled),
            _ => Err(ControlError::UnknownControl(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("unknown control '{0}'")]
    UnknownControl(String),

    #[error("invalid value '{value}' for {control}: {source}")]
    InvalidNumber {
        control: ControlId,
        value: String,
        source: ParseFloatError,
    },

    #[error("invalid value '{0}' for panEnabled (expected on or off)")]
    InvalidToggle(String),

    #[error(transparent)]
    NoiseType(#[from] ParseNoiseTypeError),
}

/// Percent as shown to the operator to the stored fraction.
pub fn percent_to_fraction(percent: f32) -> f32 {
    percent / 100.0
}

/// A change to one cached parameter. Volumes are fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterChange {
    BaseFrequency(f32),
    BeatFrequency(f32),
    Volume(f32),
    NoiseVolume(f32),
    NoiseType(NoiseType),
}

/// One control-input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    Parameter(ParameterChange),
    PanToggle(bool),
}

impl ControlInput {
    /// Parse an operator-facing `(control, value)` pair. Volumes are given in
    /// percent. Numbers are not range checked.
    pub fn parse(control: &str, value: &str) -> Result<Self, ControlError> {
        let control: ControlId = control.parse()?;
        let value = value.trim();
        let number = |value: &str| {
            value
                .parse::<f32>()
                .map_err(|source| ControlError::InvalidNumber {
                    control,
                    value: value.to_string(),
                    source,
                })
        };

        let input = match control {
            ControlId::BaseFrequency => {
                ControlInput::Parameter(ParameterChange::BaseFrequency(number(value)?))
            }
            ControlId::BeatFrequency => {
                ControlInput::Parameter(ParameterChange::BeatFrequency(number(value)?))
            }
            ControlId::Volume => ControlInput::Parameter(ParameterChange::Volume(
                percent_to_fraction(number(value)?),
            )),
            ControlId::NoiseVolume => ControlInput::Parameter(ParameterChange::NoiseVolume(
                percent_to_fraction(number(value)?),
            )),
            ControlId::NoiseType => {
                ControlInput::Parameter(ParameterChange::NoiseType(value.parse()?))
            }
            ControlId::PanEnabled => ControlInput::PanToggle(parse_toggle(value)?),
        };
        Ok(input)
    }
}

fn parse_toggle(value: &str) -> Result<bool, ControlError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(ControlError::InvalidToggle(value.to_string())),
    }
}

/// Last known value of every control, applied on the next start.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub tone: ToneParameters,
    pub noise: NoiseParameters,
}

impl Controls {
    pub fn apply(&mut self, change: ParameterChange) {
        match change {
            ParameterChange::BaseFrequency(hz) => self.tone.base_frequency_hz = hz,
            ParameterChange::BeatFrequency(hz) => self.tone.beat_frequency_hz = hz,
            ParameterChange::Volume(volume) => self.tone.volume = volume,
            ParameterChange::NoiseVolume(volume) => self.noise.volume = volume,
            ParameterChange::NoiseType(noise_type) => self.noise.noise_type = noise_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_ids_roundtrip() {
        for id in ControlId::ALL {
            assert_eq!(id.as_str().parse::<ControlId>().unwrap(), id);
        }
        assert_eq!("beat".parse::<ControlId>().unwrap(), ControlId::BeatFrequency);
        assert!(matches!(
            "treble".parse::<ControlId>(),
            Err(ControlError::UnknownControl(name)) if name == "treble"
        ));
    }

    #[test]
    fn test_parse_volume_percent() {
        assert_eq!(
            ControlInput::parse("volume", "50").unwrap(),
            ControlInput::Parameter(ParameterChange::Volume(0.5))
        );
        assert_eq!(
            ControlInput::parse("noiseVolume", " 25 ").unwrap(),
            ControlInput::Parameter(ParameterChange::NoiseVolume(0.25))
        );
    }

    #[test]
    fn test_parse_passes_out_of_range_values_through() {
        assert_eq!(
            ControlInput::parse("volume", "150").unwrap(),
            ControlInput::Parameter(ParameterChange::Volume(1.5))
        );
        assert_eq!(
            ControlInput::parse("baseFrequencyHz", "-20").unwrap(),
            ControlInput::Parameter(ParameterChange::BaseFrequency(-20.0))
        );
    }

    #[test]
    fn test_parse_noise_and_pan() {
        assert_eq!(
            ControlInput::parse("noiseType", "brown").unwrap(),
            ControlInput::Parameter(ParameterChange::NoiseType(NoiseType::Brown))
        );
        assert_eq!(
            ControlInput::parse("pan", "on").unwrap(),
            ControlInput::PanToggle(true)
        );
        assert_eq!(
            ControlInput::parse("panEnabled", "false").unwrap(),
            ControlInput::PanToggle(false)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ControlInput::parse("beat", "fast"),
            Err(ControlError::InvalidNumber { control: ControlId::BeatFrequency, .. })
        ));
        assert!(matches!(
            ControlInput::parse("noise", "violet"),
            Err(ControlError::NoiseType(_))
        ));
        assert!(matches!(
            ControlInput::parse("pan", "maybe"),
            Err(ControlError::InvalidToggle(_))
        ));
    }

    #[test]
    fn test_controls_apply() {
        let mut controls = Controls::default();
        controls.apply(ParameterChange::BaseFrequency(300.0));
        controls.apply(ParameterChange::NoiseType(NoiseType::Pink));
        controls.apply(ParameterChange::NoiseVolume(0.2));

        assert_eq!(controls.tone.base_frequency_hz, 300.0);
        assert_eq!(controls.tone.right_hz(), 310.0);
        assert_eq!(controls.noise.noise_type, NoiseType::Pink);
        assert_eq!(controls.noise.volume, 0.2);
    }
}
