//! Reading the audio settings out of a model's `config.json`.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Sample rate used when the config does not name one.
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Errors that can occur while reading a model configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("IO error reading {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model config {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid sample rate in {0}: must be greater than zero")]
    InvalidSampleRate(String),
}

/// The subset of a model configuration this tool needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub sample_rate: u32,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    audio: Option<RawAudio>,
    #[serde(default)]
    sample_rate: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawAudio {
    #[serde(default)]
    sample_rate: Option<u32>,
}

impl ModelConfig {
    /// Load the config at `path`.
    ///
    /// The sample rate is taken from `audio.sample_rate`, then from a
    /// top-level `sample_rate`, and finally falls back to
    /// [`DEFAULT_SAMPLE_RATE`]. All other fields are ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();

        let json = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(display.clone())
            } else {
                ConfigError::IoError {
                    path: display.clone(),
                    source,
                }
            }
        })?;

        Self::from_json(&json).map_err(|e| match e {
            ConfigError::Invalid { source, .. } => ConfigError::Invalid {
                path: display.clone(),
                source,
            },
            ConfigError::InvalidSampleRate(_) => ConfigError::InvalidSampleRate(display.clone()),
            other => other,
        })
    }

    /// Parse a config from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|source| ConfigError::Invalid {
            path: "<inline>".to_string(),
            source,
        })?;

        let sample_rate = raw
            .audio
            .and_then(|audio| audio.sample_rate)
            .or(raw.sample_rate)
            .unwrap_or(DEFAULT_SAMPLE_RATE);

        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate("<inline>".to_string()));
        }

        Ok(Self { sample_rate })
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}
