//! Command orchestration.
//!
//! Ties argument parsing, model resolution and the engine together behind a
//! single error boundary, and maps the outcome to an exit code.

mod run;

pub use run::{
    ERROR_PREFIX, EXIT_FAILURE, EXIT_SUCCESS, SynthesisError, run, synthesize_text,
};
