//! Model directory layout.

use std::path::{Path, PathBuf};

/// File name of the trained weights inside a model directory.
pub const WEIGHTS_FILE: &str = "model.pth";

/// File name of the model configuration inside a model directory.
pub const CONFIG_FILE: &str = "config.json";

/// Paths to the two files a model directory must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub weights_path: PathBuf,
    pub config_path: PathBuf,
}

impl ModelFiles {
    /// Resolve the weights and config paths under `model_dir`.
    ///
    /// This is a pure path join: nothing is checked on disk. Missing files
    /// are reported later, when an engine is loaded from these paths.
    pub fn resolve(model_dir: impl AsRef<Path>) -> Self {
        let model_dir = model_dir.as_ref();

        Self {
            weights_path: model_dir.join(WEIGHTS_FILE),
            config_path: model_dir.join(CONFIG_FILE),
        }
    }
}
