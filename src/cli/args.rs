//! CLI argument definitions and parsing.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::engine::{BackendConfig, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};

/// One-line usage shown for any malformed invocation.
pub const USAGE: &str = "Usage: synthesize <model_dir> <text> <output_file>";

/// Synthesize a WAV file from text with a pre-trained TTS model.
///
/// Exactly three arguments are always taken literally as
/// `<model_dir> <text> <output_file>`. Options are only recognised in the
/// form `synthesize [OPTIONS] -- <model_dir> <text> <output_file>`.
#[derive(Parser, Debug)]
#[command(name = "synthesize")]
#[command(about = "Synthesize speech from text with a pre-trained TTS model")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Model directory containing model.pth and config.json
    #[arg(value_name = "model_dir")]
    pub model_dir: PathBuf,

    /// Text to synthesize
    #[arg(value_name = "text")]
    pub text: String,

    /// Output WAV file
    #[arg(value_name = "output_file")]
    pub output: PathBuf,

    /// Model server address
    #[arg(long, default_value = DEFAULT_BACKEND_URL)]
    pub backend: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Number of positional arguments after the program name.
const POSITIONALS: usize = 3;

/// Errors that can occur when parsing the command line.
///
/// Every variant prints as the one-line usage.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Usage: synthesize <model_dir> <text> <output_file>")]
    WrongArgumentCount(usize),

    /// Malformed options in the `[OPTIONS] -- ...` form.
    #[error("Usage: synthesize <model_dir> <text> <output_file>")]
    Invalid(String),
}

/// A validated request to synthesize one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub model_dir: PathBuf,
    pub text: String,
    pub output: PathBuf,
}

impl Args {
    /// Parse arguments, including the program name in first position.
    ///
    /// With exactly three arguments after the program name nothing is
    /// treated as an option, so text like `-v` or an output like `-o.wav`
    /// is kept as is. Any other count is only accepted when `--` is followed
    /// by exactly three arguments.
    pub fn parse_from_args<I, T>(argv: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(UsageError::WrongArgumentCount(0));
        }
        let count = argv.len() - 1;

        if count == POSITIONALS {
            argv.insert(1, OsString::from("--"));
        } else {
            let separator = argv[1..].iter().position(|arg| arg == "--");
            match separator {
                Some(index) if count - index - 1 == POSITIONALS => {}
                _ => return Err(UsageError::WrongArgumentCount(count)),
            }
        }

        Self::try_parse_from(argv).map_err(|e| UsageError::Invalid(e.to_string()))
    }

    /// The synthesis request described by the positional arguments.
    pub fn invocation(&self) -> Invocation {
        Invocation {
            model_dir: self.model_dir.clone(),
            text: self.text.clone(),
            output: self.output.clone(),
        }
    }

    /// Model server settings from the flags.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(self.backend.clone()).with_timeout(Duration::from_secs(self.timeout))
    }
}
