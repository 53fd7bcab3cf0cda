//! Model directory resolution and configuration.
//!
//! A model directory holds the trained weights (`model.pth`) and the model
//! configuration (`config.json`). Only the audio section of the config is
//! read here; the weights are handed to the model server untouched.

mod config;
mod files;

pub use config::{ConfigError, DEFAULT_SAMPLE_RATE, ModelConfig};
pub use files::{CONFIG_FILE, ModelFiles, WEIGHTS_FILE};
