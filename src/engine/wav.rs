//! WAV decoding of backend responses and encoding of output files.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::types::{AudioBuffer, EngineError};

/// Floor for the normalization peak, so near-silent audio is not blown up.
const MIN_NORMALIZATION_PEAK: f32 = 0.01;

/// Decode WAV bytes into a mono buffer.
///
/// Integer PCM is scaled into `[-1.0, 1.0]`. Multi-channel audio is
/// downmixed by averaging the channels of each frame.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer, EngineError> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| EngineError::InvalidAudio(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| EngineError::InvalidAudio(e.to_string()))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| EngineError::InvalidAudio(e.to_string()))?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

/// Write `samples` to `path` as mono 16-bit PCM at `sample_rate`.
///
/// The parent directory must already exist.
pub fn write_wav(samples: &[f32], sample_rate: u32, path: &Path) -> Result<(), EngineError> {
    let writer = WavWriter::create(path, pcm16_spec(sample_rate))?;
    write_samples(writer, samples)
}

/// Encode `audio` as mono 16-bit PCM WAV bytes.
pub fn encode_wav(audio: &AudioBuffer) -> Result<Vec<u8>, EngineError> {
    let mut cursor = Cursor::new(Vec::new());
    let writer = WavWriter::new(&mut cursor, pcm16_spec(audio.sample_rate))?;
    write_samples(writer, &audio.samples)?;
    Ok(cursor.into_inner())
}

fn pcm16_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

// Samples are peak-normalized to full scale before quantizing.
fn write_samples<W: Write + Seek>(
    mut writer: WavWriter<W>,
    samples: &[f32],
) -> Result<(), EngineError> {
    let peak = samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()));
    let scale = i16::MAX as f32 / peak.max(MIN_NORMALIZATION_PEAK);

    for &sample in samples {
        writer.write_sample((sample * scale) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}
