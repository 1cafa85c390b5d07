use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use binaural_core::{Controls, NoiseParameters, ToneParameters};

/// Startup defaults, read from TOML. Never written back.
///
/// ```toml
/// [tone]
/// baseFrequencyHz = 136.1
/// beatFrequencyHz = 4.0
/// volume = 0.4
///
/// [noise]
/// type = "pink"
/// volume = 0.3
/// panEnabled = true
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tone: ToneParameters,
    pub noise: NoiseParameters,
}

impl Config {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("binaural").join("config.toml"))
    }

    /// Load from `path`, or from the user config directory when no path is
    /// given. Any failure falls back to the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::config_path) else {
            return Self::default();
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::read(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "{err:#}, using defaults");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).context("failed to read config")?;
        toml::from_str(&contents).context("failed to parse config")
    }

    pub fn controls(&self) -> Controls {
        Controls {
            tone: self.tone,
            noise: self.noise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binaural_core::NoiseType;
    use std::io::Write;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tone]\nbeatFrequencyHz = 4.0\n\n[noise]\ntype = \"brown\"").unwrap();

        let config = Config::load(Some(file.path()));

        assert_eq!(config.tone.base_frequency_hz, 200.0);
        assert_eq!(config.tone.beat_frequency_hz, 4.0);
        assert_eq!(config.noise.noise_type, NoiseType::Brown);
        assert_eq!(config.noise.volume, 0.5);
        assert!(!config.noise.pan_enabled);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tone\nvolume = ").unwrap();

        assert_eq!(Config::load(Some(file.path())), Config::default());
    }

    #[test]
    fn test_controls_mirror_config() {
        let config = Config::default();
        let controls = config.controls();
        assert_eq!(controls.tone.left_hz(), 200.0);
        assert_eq!(controls.tone.right_hz(), 210.0);
        assert_eq!(controls.noise.noise_type, NoiseType::None);
    }
}
