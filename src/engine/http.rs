//! Engine backed by a Coqui-TTS compatible model server.

use std::path::Path;

use log::{debug, info};
use reqwest::Url;

use crate::model::{ModelConfig, ModelFiles};

use super::types::{AudioBuffer, BackendConfig, EngineError};
use super::wav;
use super::{Engine, EngineLoader};

/// Builds [`HttpEngine`]s that talk to one model server.
pub struct HttpLoader {
    config: BackendConfig,
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    /// Create a loader for the server described by `config`.
    pub fn new(config: BackendConfig) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;

        Ok(Self { config, client })
    }
}

impl EngineLoader for HttpLoader {
    type Engine = HttpEngine;

    fn load(&self, files: &ModelFiles) -> Result<HttpEngine, EngineError> {
        check_weights(&files.weights_path)?;
        let model_config = ModelConfig::load(&files.config_path)?;

        info!(
            "Loaded model {} ({} Hz)",
            files.weights_path.display(),
            model_config.sample_rate
        );

        Ok(HttpEngine {
            tts_url: self.config.tts_url(),
            client: self.client.clone(),
            files: files.clone(),
            model_config,
        })
    }
}

/// The weights are opaque here; they only need to be a readable file.
fn check_weights(path: &Path) -> Result<(), EngineError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EngineError::ModelFileMissing(path.display().to_string())
        } else {
            EngineError::IoError(e)
        }
    })?;

    if !file.metadata()?.is_file() {
        return Err(EngineError::InvalidModelFile(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    Ok(())
}

/// An engine bound to one model on the model server.
pub struct HttpEngine {
    tts_url: String,
    client: reqwest::blocking::Client,
    files: ModelFiles,
    model_config: ModelConfig,
}

impl HttpEngine {
    /// The model files this engine was loaded from.
    pub fn files(&self) -> &ModelFiles {
        &self.files
    }

    /// The model configuration read at load time.
    pub fn model_config(&self) -> ModelConfig {
        self.model_config
    }

    fn request_url(&self, text: &str) -> Result<Url, EngineError> {
        let mut url =
            Url::parse(&self.tts_url).map_err(|e| EngineError::RequestFailed(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("text", text)
            .append_pair("model_path", &self.files.weights_path.to_string_lossy())
            .append_pair("config_path", &self.files.config_path.to_string_lossy());
        Ok(url)
    }
}

impl Engine for HttpEngine {
    fn synthesize(&self, text: &str) -> Result<AudioBuffer, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyText);
        }

        let url = self.request_url(text)?;
        debug!("Requesting synthesis from {}", self.tts_url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let body = body.trim();
            return Err(EngineError::RequestFailed(if body.is_empty() {
                format!("Status: {status}")
            } else {
                format!("Status: {status}: {body}")
            }));
        }

        let bytes = response
            .bytes()
            .map_err(|e| EngineError::InvalidAudio(e.to_string()))?;
        let audio = wav::decode_wav(&bytes)?;

        if audio.sample_rate != self.model_config.sample_rate {
            return Err(EngineError::InvalidAudio(format!(
                "backend returned {} Hz audio, model config expects {} Hz",
                audio.sample_rate, self.model_config.sample_rate
            )));
        }
        debug!(
            "Received {} samples ({:.2}s)",
            audio.samples.len(),
            audio.duration()
        );

        Ok(audio)
    }

    /// Written at the model's configured output rate.
    fn save_wav(&self, audio: &AudioBuffer, path: &Path) -> Result<(), EngineError> {
        wav::write_wav(&audio.samples, self.model_config.sample_rate, path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}
