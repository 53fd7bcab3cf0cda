//! The synthesize command: argument check, model load, synthesis, save.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use crate::cli::{Args, Invocation};
use crate::engine::{Engine, EngineError, EngineLoader};
use crate::model::ModelFiles;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for usage violations and any synthesis failure.
pub const EXIT_FAILURE: u8 = 1;

/// Prefix of the single stderr line written on failure.
pub const ERROR_PREFIX: &str = "Error during synthesis";

/// A failure anywhere between engine setup and the saved file.
///
/// The variants tell the steps apart for callers and logs; on the command
/// line they all print with [`ERROR_PREFIX`] and exit with [`EXIT_FAILURE`].
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("{0:#}")]
    Setup(anyhow::Error),

    #[error("{0}")]
    Load(#[source] EngineError),

    #[error("{0}")]
    Synthesize(#[source] EngineError),

    #[error("Failed to save audio to {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: EngineError,
    },
}

/// Load the model, synthesize the text and save it to the output path.
///
/// Returns the path that was written.
pub fn synthesize_text<L: EngineLoader>(
    loader: &L,
    invocation: &Invocation,
) -> Result<PathBuf, SynthesisError> {
    let files = ModelFiles::resolve(&invocation.model_dir);
    debug!(
        "Model files: {} and {}",
        files.weights_path.display(),
        files.config_path.display()
    );

    info!("Loading model from {}", invocation.model_dir.display());
    let engine = loader.load(&files).map_err(SynthesisError::Load)?;

    info!("Synthesizing {} characters", invocation.text.chars().count());
    let audio = engine
        .synthesize(&invocation.text)
        .map_err(SynthesisError::Synthesize)?;

    info!("Saving audio to {}", invocation.output.display());
    engine
        .save_wav(&audio, &invocation.output)
        .map_err(|source| SynthesisError::Save {
            path: invocation.output.display().to_string(),
            source,
        })?;

    Ok(invocation.output.clone())
}

/// Run the command line `argv` (program name first) and return the exit code.
///
/// `setup` builds the engine loader once the arguments are known to be
/// valid; it is never called for a usage violation. Exactly one line is
/// written: the confirmation to `out`, or the usage or error message to `err`.
/// A run whose confirmation cannot be written to `out` fails.
pub fn run<I, T, L, F>(argv: I, setup: F, out: &mut impl Write, err: &mut impl Write) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    L: EngineLoader,
    F: FnOnce(&Args) -> anyhow::Result<L>,
{
    let args = match Args::parse_from_args(argv) {
        Ok(args) => args,
        Err(e) => {
            let _ = writeln!(err, "{e}");
            return EXIT_FAILURE;
        }
    };

    let result = setup(&args)
        .map_err(SynthesisError::Setup)
        .and_then(|loader| synthesize_text(&loader, &args.invocation()));

    match result {
        Ok(path) => match writeln!(out, "Successfully synthesized text to {}", path.display())
            .and_then(|()| out.flush())
        {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                let _ = writeln!(err, "{ERROR_PREFIX}: Failed to report success: {e}");
                EXIT_FAILURE
            }
        },
        Err(e) => {
            let _ = writeln!(err, "{ERROR_PREFIX}: {e}");
            EXIT_FAILURE
        }
    }
}
