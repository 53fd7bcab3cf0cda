//! synthesize CLI entry point.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::LevelFilter;
use tts_synthesize::app;
use tts_synthesize::cli::Args;
use tts_synthesize::engine::HttpLoader;

fn main() -> ExitCode {
    let code = app::run(
        std::env::args_os(),
        setup,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );

    ExitCode::from(code)
}

fn setup(args: &Args) -> Result<HttpLoader> {
    init_logging(args.verbose);

    HttpLoader::new(args.backend_config())
        .with_context(|| format!("Failed to create client for {}", args.backend))
}

/// Logs go to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("tts_synthesize", level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
