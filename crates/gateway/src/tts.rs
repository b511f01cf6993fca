//! Text-to-speech flow: text in, playable WAV data URI out.

use std::sync::Arc;

use agri_assist_core::{
    traits::SpeechSynthesizer,
    types::{TextToSpeechInput, TextToSpeechOutput},
    validate::Validate,
    Error, Result,
};

use crate::audio::{self, AudioFormat, WavStreamWriter};

pub struct SpeechFlow {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SpeechFlow {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    pub async fn run(&self, input: &TextToSpeechInput) -> Result<TextToSpeechOutput> {
        input.validate()?;
        self.speak(&input.text).await
    }

    /// Synthesize `text` and wrap the PCM in a WAV container.
    pub async fn speak(&self, text: &str) -> Result<TextToSpeechOutput> {
        let speech = self.synthesizer.synthesize(text).await?;

        let container = AudioFormat::from_mime_type(&speech.mime_type)
            .or_else(|| speech.chunks.first().and_then(|c| AudioFormat::detect(c)));
        if let Some(format) = container {
            return Err(Error::encoding(format!(
                "expected raw PCM, service returned {}",
                format.mime_type()
            )));
        }

        if let Some(rate) = speech.declared_rate() {
            if rate != audio::SAMPLE_RATE {
                tracing::warn!(
                    declared = rate,
                    expected = audio::SAMPLE_RATE,
                    "Speech sample rate differs from container rate"
                );
            }
        }

        let mut writer = WavStreamWriter::new();
        for chunk in &speech.chunks {
            writer.write_chunk(chunk);
        }
        let samples = writer.sample_count();
        let wav = writer.finalize()?;

        tracing::debug!(
            chunks = speech.chunks.len(),
            samples,
            pcm_bytes = speech.total_len(),
            wav_bytes = wav.len(),
            "Speech encoded"
        );

        Ok(TextToSpeechOutput {
            audio_data_uri: audio::wav_data_uri(&wav),
        })
    }
}
