//! Gemini REST client.
//!
//! Talks to the `generateContent` endpoint directly: structured JSON output
//! for the text flows and inline audio for speech synthesis.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use agri_assist_core::{
    traits::{
        CompletionClient, CompletionRequest, CompletionResponse, SpeechSynthesizer,
        SynthesizedSpeech, TokenUsage,
    },
    Error, Result,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
    /// Model for structured completions.
    pub model: String,
    /// Model for speech synthesis.
    pub tts_model: String,
    /// Prebuilt voice name.
    pub voice: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: "gemini-2.0-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Algenib".to_string(),
            timeout: Duration::from_secs(45),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Gemini client implementing both service boundaries.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn post(&self, model: &str, body: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(model = %model, status = %status, "Gemini request failed");
            return Err(map_status_error(status, &detail));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| Error::unavailable(format!("Unreadable Gemini response: {}", e)))
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        tracing::debug!(
            flow = %request.flow,
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            media = request.media.len(),
            "Calling Gemini"
        );

        let body = completion_body(request);
        let response = self.post(&self.config.model, &body).await?;
        Ok(response.into_completion())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedSpeech> {
        tracing::debug!(
            model = %self.config.tts_model,
            voice = %self.config.voice,
            text_len = text.len(),
            "Calling Gemini TTS"
        );

        let body = speech_body(text, &self.config.voice);
        let response = self.post(&self.config.tts_model, &body).await?;
        response.into_speech()
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(format!("Gemini request timed out: {}", err))
    } else {
        Error::unavailable(format!("Gemini unreachable: {}", err))
    }
}

fn map_status_error(status: reqwest::StatusCode, detail: &str) -> Error {
    let message = serde_json::from_str::<Value>(detail)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| detail.chars().take(200).collect());

    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Error::unavailable(format!("Gemini returned {}: {}", status, message))
    } else if status == reqwest::StatusCode::REQUEST_TIMEOUT {
        Error::Timeout(format!("Gemini returned {}: {}", status, message))
    } else {
        Error::ModelProvider(format!("Gemini returned {}: {}", status, message))
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

fn completion_body(request: &CompletionRequest) -> GenerateContentRequest {
    let mut parts = vec![Part {
        text: Some(request.prompt.clone()),
        inline_data: None,
    }];
    parts.extend(request.media.iter().map(|m| Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: m.mime_type.clone(),
            data: m.data.clone(),
        }),
    }));

    let generation_config = request.output_schema.as_ref().map(|schema| {
        serde_json::json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        })
    });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config,
    }
}

fn speech_body(text: &str, voice: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
            }],
        }],
        generation_config: Some(serde_json::json!({
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        })),
    }
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    fn into_completion(self) -> CompletionResponse {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        let usage = self
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        CompletionResponse {
            text: (!text.trim().is_empty()).then_some(text),
            finish_reason: self.candidates.first().and_then(|c| c.finish_reason.clone()),
            usage,
        }
    }

    fn into_speech(self) -> Result<SynthesizedSpeech> {
        let mut mime_type = None;
        let mut chunks = Vec::new();

        for inline in self.first_parts().iter().filter_map(|p| p.inline_data.as_ref()) {
            if !inline.mime_type.starts_with("audio/") {
                continue;
            }
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .map_err(|e| Error::unavailable(format!("Invalid audio payload: {}", e)))?;
            mime_type.get_or_insert_with(|| inline.mime_type.clone());
            chunks.push(bytes);
        }

        match mime_type {
            Some(mime_type) => Ok(SynthesizedSpeech { chunks, mime_type }),
            None => Err(Error::empty_response("no media returned")),
        }
    }
}
