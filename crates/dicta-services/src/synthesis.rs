//! Speech synthesis collaborator.
//!
//! Contract: text in, encoded audio bytes out. A synthesis failure is never
//! fatal to a session; the engine logs it and continues without audio.

use std::future::Future;
use std::io::Cursor;

use dicta_core::error::{DictaError, Result};

/// Service producing spoken audio for a passage.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize audio for the given text. The payload is an encoded clip
    /// (e.g. WAV) that the playback controller can decode.
    fn synthesize(&self, text: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// In-process synthesizer producing a deterministic tone sequence.
///
/// One short beep per word, pitch cycling over the word index, paced by the
/// configured speaking rate. Not speech, but it gives every part of the
/// audio path (decode, play, pause, replay, natural end) something real to
/// chew on without a network or a model.
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    speaking_rate: f64,
}

const SAMPLE_RATE: u32 = 22_050;

impl ToneSynthesizer {
    /// `speaking_rate` is a tempo multiplier; dictation conventionally uses
    /// a value slightly below 1.0.
    pub fn new(speaking_rate: f64) -> Self {
        Self {
            speaking_rate: if speaking_rate > 0.0 {
                speaking_rate
            } else {
                1.0
            },
        }
    }

    fn render(&self, text: &str) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| DictaError::Synthesis(e.to_string()))?;

            for (index, word) in text.split_whitespace().enumerate() {
                let frequency = 220.0 + 40.0 * (index % 8) as f32;
                let beep_secs = (0.12 + 0.03 * word.chars().count() as f64) / self.speaking_rate;
                let beep_samples = (beep_secs * SAMPLE_RATE as f64) as u32;
                for n in 0..beep_samples {
                    let t = n as f32 / SAMPLE_RATE as f32;
                    let amplitude =
                        (t * frequency * 2.0 * std::f32::consts::PI).sin() * 0.3;
                    writer
                        .write_sample((amplitude * i16::MAX as f32) as i16)
                        .map_err(|e| DictaError::Synthesis(e.to_string()))?;
                }
                let gap_samples = (0.08 * SAMPLE_RATE as f64 / self.speaking_rate) as u32;
                for _ in 0..gap_samples {
                    writer
                        .write_sample(0i16)
                        .map_err(|e| DictaError::Synthesis(e.to_string()))?;
                }
            }

            writer
                .finalize()
                .map_err(|e| DictaError::Synthesis(e.to_string()))?;
        }
        Ok(cursor.into_inner())
    }
}

impl SpeechSynthesizer for ToneSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let bytes = self.render(text)?;
        tracing::debug!(
            words = text.split_whitespace().count(),
            bytes = bytes.len(),
            "Tone audio synthesized"
        );
        Ok(bytes)
    }
}

/// Synthesizer that always fails. Exercises the audio-optional failure path.
#[derive(Debug, Clone, Default)]
pub struct FailingSynthesizer;

impl SpeechSynthesizer for FailingSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Err(DictaError::Synthesis(
            "synthesis backend unavailable".to_string(),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
