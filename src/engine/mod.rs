//! Speech synthesis engine.
//!
//! An engine is reached through three capability points: loading it from a
//! model directory, synthesizing text into an [`AudioBuffer`], and saving
//! that buffer as a WAV file. [`HttpEngine`] implements them against a
//! Coqui-TTS compatible model server.

mod http;
mod types;
pub mod wav;

pub use http::{HttpEngine, HttpLoader};
pub use types::{
    AudioBuffer, BackendConfig, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS, EngineError,
};

use std::path::Path;

use crate::model::ModelFiles;

/// Constructs an engine from a model's weights and configuration.
///
/// Loading may do heavy I/O and fails when the files are missing or
/// malformed.
#[cfg_attr(test, mockall::automock(type Engine = MockEngine;))]
pub trait EngineLoader {
    type Engine: Engine;

    fn load(&self, files: &ModelFiles) -> Result<Self::Engine, EngineError>;
}

/// A loaded text-to-speech engine.
#[cfg_attr(test, mockall::automock)]
pub trait Engine {
    /// Synthesize `text` into a waveform.
    fn synthesize(&self, text: &str) -> Result<AudioBuffer, EngineError>;

    /// Write `audio` to `path` as a WAV file.
    fn save_wav(&self, audio: &AudioBuffer, path: &Path) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CONFIG_FILE, ModelConfig, WEIGHTS_FILE};
    use httpmock::{Method::GET, MockServer};
    use tempfile::TempDir;

    fn model_dir(config: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(WEIGHTS_FILE), b"fake weights").unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), config).unwrap();
        temp_dir
    }

    fn tone(sample_rate: u32) -> AudioBuffer {
        let samples = (0..sample_rate / 10)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        AudioBuffer::new(samples, sample_rate)
    }

    fn loader_for(server: &MockServer) -> HttpLoader {
        HttpLoader::new(BackendConfig::new(server.base_url())).unwrap()
    }

    // ===========================================
    // AudioBuffer / BackendConfig tests
    // ===========================================

    #[test]
    fn test_audio_buffer_duration() {
        let audio = AudioBuffer::new(vec![0.1, -0.8, 0.4, 0.0], 4);
        assert_eq!(audio.duration(), 1.0);

        let silent = AudioBuffer::new(vec![0.0; 10], 0);
        assert_eq!(silent.duration(), 0.0);
    }

    #[test]
    fn test_backend_config_defaults() {
        let config = BackendConfig::default();

        assert_eq!(config.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.timeout.as_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.tts_url(), "http://localhost:5002/api/tts");
    }

    #[test]
    fn test_backend_config_trims_trailing_slash() {
        let config = BackendConfig::new("http://tts.local:8000/");
        assert_eq!(config.tts_url(), "http://tts.local:8000/api/tts");
    }

    // ===========================================
    // WAV codec tests
    // ===========================================

    #[test]
    fn test_encode_wav_normalizes_to_full_scale() {
        let audio = AudioBuffer::new(vec![0.0, 0.25, -0.5], 22050);

        let bytes = wav::encode_wav(&audio).unwrap();
        let mut reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(samples, vec![0, 16383, -32767]);
    }

    #[test]
    fn test_encode_wav_does_not_amplify_near_silence() {
        let audio = AudioBuffer::new(vec![0.001, -0.001], 16000);

        let bytes = wav::encode_wav(&audio).unwrap();
        let mut reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

        assert_eq!(samples, vec![3276, -3276]);
    }

    #[test]
    fn test_decode_wav_downmixes_stereo() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in [0.5_f32, 0.1, -0.2, -0.4] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }

        let audio = wav::decode_wav(&cursor.into_inner()).unwrap();

        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.samples.len(), 2);
        assert!((audio.samples[0] - 0.3).abs() < 1e-6);
        assert!((audio.samples[1] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_decode_wav_scales_int_pcm() {
        let audio = AudioBuffer::new(vec![1.0, -1.0, 0.0], 22050);
        let bytes = wav::encode_wav(&audio).unwrap();

        let decoded = wav::decode_wav(&bytes).unwrap();

        assert_eq!(decoded.samples.len(), 3);
        assert!((decoded.samples[0] - 32767.0 / 32768.0).abs() < 1e-6);
        assert!((decoded.samples[1] + 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(decoded.samples[2], 0.0);
    }

    #[test]
    fn test_decode_wav_rejects_garbage() {
        let result = wav::decode_wav(b"definitely not a wav file");
        assert!(matches!(result.unwrap_err(), EngineError::InvalidAudio(_)));
    }

    #[test]
    fn test_write_wav_missing_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.wav");

        let result = wav::write_wav(&tone(22050).samples, 22050, &path);

        assert!(result.is_err());
        assert!(!path.exists());
    }

    // ===========================================
    // HttpLoader tests
    // ===========================================

    #[test]
    fn test_load_reads_model_config() {
        let dir = model_dir(r#"{"audio": {"sample_rate": 24000}}"#);
        let loader = HttpLoader::new(BackendConfig::default()).unwrap();

        let engine = loader.load(&ModelFiles::resolve(dir.path())).unwrap();

        assert_eq!(engine.model_config(), ModelConfig { sample_rate: 24000 });
        assert_eq!(engine.files().weights_path, dir.path().join(WEIGHTS_FILE));
    }

    #[test]
    fn test_load_missing_weights() {
        let dir = model_dir("{}");
        std::fs::remove_file(dir.path().join(WEIGHTS_FILE)).unwrap();
        let loader = HttpLoader::new(BackendConfig::default()).unwrap();

        let result = loader.load(&ModelFiles::resolve(dir.path()));

        assert!(matches!(
            result.err().unwrap(),
            EngineError::ModelFileMissing(_)
        ));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = model_dir("{}");
        std::fs::remove_file(dir.path().join(CONFIG_FILE)).unwrap();
        let loader = HttpLoader::new(BackendConfig::default()).unwrap();

        let result = loader.load(&ModelFiles::resolve(dir.path()));

        assert!(matches!(result.err().unwrap(), EngineError::Config(_)));
    }

    #[test]
    fn test_load_weights_is_directory() {
        let dir = model_dir("{}");
        std::fs::remove_file(dir.path().join(WEIGHTS_FILE)).unwrap();
        std::fs::create_dir(dir.path().join(WEIGHTS_FILE)).unwrap();
        let loader = HttpLoader::new(BackendConfig::default()).unwrap();

        let result = loader.load(&ModelFiles::resolve(dir.path()));

        assert!(result.is_err());
    }

    // ===========================================
    // HttpEngine tests against a fake model server
    // ===========================================

    #[test]
    fn test_synthesize_sends_text_and_model_paths() {
        let dir = model_dir(r#"{"audio": {"sample_rate": 22050}}"#);
        let files = ModelFiles::resolve(dir.path());
        let body = wav::encode_wav(&tone(22050)).unwrap();

        let server = MockServer::start();
        let weights = files.weights_path.to_string_lossy().into_owned();
        let config = files.config_path.to_string_lossy().into_owned();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/tts")
                .query_param("text", "Hello world")
                .query_param("model_path", weights.as_str())
                .query_param("config_path", config.as_str());
            then.status(200)
                .header("content-type", "audio/wav")
                .body(body);
        });

        let engine = loader_for(&server).load(&files).unwrap();
        let audio = engine.synthesize("Hello world").unwrap();

        mock.assert();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.samples.len(), 2205);
    }

    #[test]
    fn test_synthesize_empty_text_skips_request() {
        let dir = model_dir("{}");
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/tts");
            then.status(200);
        });

        let engine = loader_for(&server)
            .load(&ModelFiles::resolve(dir.path()))
            .unwrap();

        assert!(matches!(
            engine.synthesize("   ").unwrap_err(),
            EngineError::EmptyText
        ));
        mock.assert_hits(0);
    }

    #[test]
    fn test_synthesize_server_error() {
        let dir = model_dir("{}");
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tts");
            then.status(500).body("model crashed");
        });

        let engine = loader_for(&server)
            .load(&ModelFiles::resolve(dir.path()))
            .unwrap();
        let err = engine.synthesize("Hello").unwrap_err();

        assert!(matches!(err, EngineError::RequestFailed(_)));
        assert!(err.to_string().contains("model crashed"));
    }

    #[test]
    fn test_synthesize_invalid_audio() {
        let dir = model_dir("{}");
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tts");
            then.status(200).body("<html>not audio</html>");
        });

        let engine = loader_for(&server)
            .load(&ModelFiles::resolve(dir.path()))
            .unwrap();

        assert!(matches!(
            engine.synthesize("Hello").unwrap_err(),
            EngineError::InvalidAudio(_)
        ));
    }

    #[test]
    fn test_synthesize_connection_refused() {
        let dir = model_dir("{}");
        let loader = HttpLoader::new(BackendConfig::new("http://127.0.0.1:1")).unwrap();

        let engine = loader.load(&ModelFiles::resolve(dir.path())).unwrap();

        assert!(matches!(
            engine.synthesize("Hello").unwrap_err(),
            EngineError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_save_wav_writes_file() {
        let dir = model_dir("{}");
        let out = dir.path().join("out.wav");
        let loader = HttpLoader::new(BackendConfig::default()).unwrap();
        let engine = loader.load(&ModelFiles::resolve(dir.path())).unwrap();

        engine.save_wav(&tone(22050), &out).unwrap();

        let reader = hound::WavReader::open(&out).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.len(), 2205);
    }

    #[test]
    fn test_save_wav_uses_model_output_rate() {
        let dir = model_dir(r#"{"audio": {"sample_rate": 24000}}"#);
        let out = dir.path().join("out.wav");
        let loader = HttpLoader::new(BackendConfig::default()).unwrap();
        let engine = loader.load(&ModelFiles::resolve(dir.path())).unwrap();

        engine.save_wav(&tone(16000), &out).unwrap();

        let reader = hound::WavReader::open(&out).unwrap();
        assert_eq!(reader.spec().sample_rate, 24000);
        assert_eq!(reader.len(), 1600);
    }

    #[test]
    fn test_synthesize_rejects_sample_rate_mismatch() {
        let dir = model_dir(r#"{"audio": {"sample_rate": 24000}}"#);
        let body = wav::encode_wav(&tone(16000)).unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tts");
            then.status(200).body(body);
        });

        let engine = loader_for(&server)
            .load(&ModelFiles::resolve(dir.path()))
            .unwrap();
        let err = engine.synthesize("Hello").unwrap_err();

        assert!(matches!(err, EngineError::InvalidAudio(_)));
        assert!(err.to_string().contains("24000 Hz"));
    }
}
