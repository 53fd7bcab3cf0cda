//! tts-synthesize: synthesize a WAV file from text with a pre-trained model.
//!
//! This crate provides the `synthesize` command: it resolves `model.pth` and
//! `config.json` under a model directory, loads an engine for them, and
//! writes the synthesized speech to a WAV file.

pub mod app;
pub mod cli;
pub mod engine;
pub mod model;
