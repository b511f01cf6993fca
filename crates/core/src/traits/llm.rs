//! Completion service traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::types::MediaPart;
use crate::validate::Validate;

/// Hosted completion service.
///
/// Implementations submit one request and return the raw payload; parsing
/// against the output schema happens in the calling flow.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a structured completion.
    async fn generate(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Provider/model identifier for logs.
    fn model_name(&self) -> &str;
}

/// A filled prompt plus the shape the answer must take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Flow name, for logs and error messages.
    pub flow: String,
    /// Rendered prompt text.
    pub prompt: String,
    /// Inline media parts, in prompt order.
    pub media: Vec<MediaPart>,
    /// JSON schema of the expected output object.
    pub output_schema: Option<Value>,
}

impl CompletionRequest {
    pub fn text(flow: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            prompt: prompt.into(),
            media: Vec::new(),
            output_schema: None,
        }
    }

    pub fn with_media(mut self, media: Vec<MediaPart>) -> Self {
        self.media = media;
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// Response from the completion service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Raw output payload; `None` when the service produced nothing.
    pub text: Option<String>,
    /// Finish reason reported by the provider.
    pub finish_reason: Option<String>,
    /// Token usage.
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("STOP".to_string()),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage from a completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Input value of a prompt flow.
///
/// Serialized fields become template variables; `media` lists inline
/// payloads sent alongside the prompt text.
pub trait PromptInput: Serialize + Validate + Send + Sync {
    fn media(&self) -> Result<Vec<MediaPart>> {
        Ok(Vec::new())
    }
}
