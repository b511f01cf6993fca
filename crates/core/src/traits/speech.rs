//! Speech-synthesis service traits.

use async_trait::async_trait;

use crate::error::Result;

/// Hosted speech-synthesis service.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the configured voice.
    ///
    /// Fails with `EmptyResponse` when the service returns no media.
    async fn synthesize(&self, text: &str) -> Result<SynthesizedSpeech>;
}

/// Raw audio returned by the speech service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    /// Audio chunks in arrival order (signed 16-bit little-endian PCM).
    pub chunks: Vec<Vec<u8>>,
    /// MIME type reported by the service, e.g. `audio/L16;codec=pcm;rate=24000`.
    pub mime_type: String,
}

impl SynthesizedSpeech {
    pub fn single(pcm: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            chunks: vec![pcm],
            mime_type: mime_type.into(),
        }
    }

    pub fn total_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Sample rate declared in the MIME parameters (`rate=24000`).
    pub fn declared_rate(&self) -> Option<u32> {
        self.mime_type
            .split(';')
            .filter_map(|param| param.trim().strip_prefix("rate="))
            .find_map(|rate| rate.parse().ok())
    }
}
