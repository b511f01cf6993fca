//! Mock implementations of core traits for testing.
//!
//! Scripted doubles for the completion and speech services, shared by unit
//! and integration tests across the workspace.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{
    traits::{
        CompletionClient, CompletionRequest, CompletionResponse, SpeechSynthesizer,
        SynthesizedSpeech, TokenUsage,
    },
    Error, Result,
};

// =============================================================================
// Mock Completion Client
// =============================================================================

/// One scripted reply of [`MockCompletionClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this payload.
    Text(String),
    /// Return a response without a payload.
    Empty,
    /// Fail as if the service were unreachable.
    Unavailable,
    /// Fail as if the service timed out.
    Timeout,
}

/// Scripted mock completion client that records every request.
pub struct MockCompletionClient {
    replies: Vec<MockReply>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    /// Create a mock that cycles through `replies`.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same payload.
    pub fn constant(payload: &str) -> Self {
        Self::new(vec![MockReply::Text(payload.to_string())])
    }

    /// Create a mock that always returns `value` serialized as JSON.
    pub fn json(value: serde_json::Value) -> Self {
        Self::constant(&value.to_string())
    }

    pub fn failing(reply: MockReply) -> Self {
        Self::new(vec![reply])
    }

    /// Number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let index = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| Error::internal("mock lock poisoned"))?;
            requests.push(request.clone());
            requests.len() - 1
        };

        let reply = self
            .replies
            .get(index % self.replies.len().max(1))
            .cloned()
            .unwrap_or(MockReply::Empty);

        match reply {
            MockReply::Text(text) => Ok(CompletionResponse {
                text: Some(text),
                finish_reason: Some("STOP".to_string()),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                },
            }),
            MockReply::Empty => Ok(CompletionResponse::default()),
            MockReply::Unavailable => Err(Error::unavailable("mock service unavailable")),
            MockReply::Timeout => Err(Error::Timeout("mock service timed out".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Mock Speech Synthesizer
// =============================================================================

const PCM_MIME_TYPE: &str = "audio/L16;codec=pcm;rate=24000";

/// Speech double returning fixed PCM chunks.
pub struct MockSpeechSynthesizer {
    chunks: Option<Vec<Vec<u8>>>,
    mime_type: String,
    texts: Mutex<Vec<String>>,
}

impl MockSpeechSynthesizer {
    /// Return `chunks` for every request.
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: Some(chunks),
            mime_type: PCM_MIME_TYPE.to_string(),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Report `mime_type` instead of 24 kHz PCM.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Return `samples` of silence as a single chunk.
    pub fn silence(samples: usize) -> Self {
        Self::new(vec![vec![0u8; samples * 2]])
    }

    /// Fail every request with "no media returned".
    pub fn without_media() -> Self {
        Self {
            chunks: None,
            mime_type: PCM_MIME_TYPE.to_string(),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Texts synthesized so far.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedSpeech> {
        self.texts
            .lock()
            .map_err(|_| Error::internal("mock lock poisoned"))?
            .push(text.to_string());

        match &self.chunks {
            Some(chunks) => Ok(SynthesizedSpeech {
                chunks: chunks.clone(),
                mime_type: self.mime_type.clone(),
            }),
            None => Err(Error::empty_response("no media returned")),
        }
    }
}
