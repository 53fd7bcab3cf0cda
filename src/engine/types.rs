//! Engine data types and errors.

use std::time::Duration;

use thiserror::Error;

use crate::model::ConfigError;

/// Default address of the model server.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5002";

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Errors that can occur while loading a model, synthesizing or saving audio.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Model file not found: {0}")]
    ModelFileMissing(String),

    #[error("Invalid model file: {0}")]
    InvalidModelFile(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Text to synthesize is empty")]
    EmptyText,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid audio from backend: {0}")]
    InvalidAudio(String),

    #[error("WAV encoding error: {0}")]
    WavEncodingError(#[from] hound::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Mono waveform produced by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples, nominally in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Connection settings for the model server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the synthesis endpoint.
    pub fn tts_url(&self) -> String {
        format!("{}/api/tts", self.base_url.trim_end_matches('/'))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}
