//! Rig completion client adapter.
//!
//! Wraps Rig's Agent for the OpenAI and Anthropic providers. These providers
//! get the output schema as a prompt instruction instead of a native
//! structured-output setting, and do not accept inline media.

use async_trait::async_trait;

use agri_assist_core::{
    traits::{CompletionClient, CompletionRequest, CompletionResponse, TokenUsage},
    Error, Result,
};

// Import required Rig traits
use rig::client::{CompletionClient as _, ProviderClient};
use rig::completion::Prompt;

/// Provider type for Rig clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

impl RigProvider {
    /// Environment variable holding the provider key.
    pub fn key_var(&self) -> &'static str {
        match self {
            RigProvider::OpenAI => "OPENAI_API_KEY",
            RigProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Configuration for Rig client.
#[derive(Debug, Clone)]
pub struct RigConfig {
    /// Provider to use.
    pub provider: RigProvider,
    /// Model name.
    pub model: String,
    /// System prompt.
    pub system_prompt: Option<String>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            system_prompt: Some(
                "You are the structured-output engine of a farming assistance app. \
                 Reply with a single JSON object and nothing else."
                    .to_string(),
            ),
        }
    }
}

impl RigConfig {
    /// Create config for OpenAI.
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for Anthropic.
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::Anthropic,
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Rig-based completion client.
pub struct RigCompletionClient {
    config: RigConfig,
}

impl RigCompletionClient {
    /// Create a new Rig client with the given configuration.
    pub fn new(config: RigConfig) -> Self {
        Self { config }
    }

    /// Create a client for OpenAI GPT-4o-mini.
    pub fn gpt4o_mini() -> Self {
        Self::new(RigConfig::openai("gpt-4o-mini"))
    }

    /// Create a client for Claude Haiku.
    pub fn claude_haiku() -> Self {
        Self::new(RigConfig::anthropic("claude-3-haiku-20240307"))
    }

    /// Append the output schema to the prompt as an instruction.
    fn build_prompt(&self, request: &CompletionRequest) -> String {
        match &request.output_schema {
            Some(schema) => format!(
                "{}\n\nRespond only with a JSON object matching this JSON schema:\n{}",
                request.prompt, schema
            ),
            None => request.prompt.clone(),
        }
    }

    /// Call OpenAI via Rig.
    async fn call_openai(&self, prompt: &str) -> Result<String> {
        use rig::providers::openai;

        let client = openai::Client::from_env();
        let mut agent_builder = client.agent(&self.config.model);
        if let Some(ref system) = self.config.system_prompt {
            agent_builder = agent_builder.preamble(system);
        }
        let agent = agent_builder.build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("OpenAI error: {}", e)))
    }

    /// Call Anthropic via Rig.
    async fn call_anthropic(&self, prompt: &str) -> Result<String> {
        use rig::providers::anthropic;

        let client = anthropic::Client::from_env();
        let mut agent_builder = client.agent(&self.config.model);
        if let Some(ref system) = self.config.system_prompt {
            agent_builder = agent_builder.preamble(system);
        }
        let agent = agent_builder.build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("Anthropic error: {}", e)))
    }
}

#[async_trait]
impl CompletionClient for RigCompletionClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        if !request.media.is_empty() {
            return Err(Error::invalid_request(format!(
                "{:?} client does not accept inline media ({})",
                self.config.provider, request.flow
            )));
        }

        // Rig's from_env panics without a key.
        let key_var = self.config.provider.key_var();
        if std::env::var(key_var).is_err() {
            return Err(Error::ModelProvider(format!("{} not set", key_var)));
        }

        let prompt = self.build_prompt(request);

        tracing::debug!(
            flow = %request.flow,
            provider = ?self.config.provider,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Calling LLM"
        );

        let response = match self.config.provider {
            RigProvider::OpenAI => self.call_openai(&prompt).await?,
            RigProvider::Anthropic => self.call_anthropic(&prompt).await?,
        };

        // Rig does not report usage through `prompt`; estimate at ~4 chars/token.
        let usage = TokenUsage {
            prompt_tokens: (prompt.len() / 4) as u64,
            completion_tokens: (response.len() / 4) as u64,
            total_tokens: ((prompt.len() + response.len()) / 4) as u64,
        };

        Ok(CompletionResponse {
            text: (!response.trim().is_empty()).then_some(response),
            finish_reason: Some("stop".to_string()),
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_assist_core::types::MediaPart;
    use serde_json::json;

    #[test]
    fn test_config_builder() {
        let config = RigConfig::anthropic("claude-3-5-sonnet-20241022");

        assert_eq!(config.provider, RigProvider::Anthropic);
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
        assert!(config.system_prompt.as_deref().unwrap().contains("JSON"));
        assert_eq!(config.provider.key_var(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_build_prompt_appends_schema() {
        let client = RigCompletionClient::gpt4o_mini();
        let request = CompletionRequest::text("chatFlow", "Answer the query")
            .with_output_schema(json!({"type": "object"}));

        let prompt = client.build_prompt(&request);
        assert!(prompt.starts_with("Answer the query"));
        assert!(prompt.contains("JSON schema"));
        assert!(prompt.ends_with("{\"type\":\"object\"}"));
    }

    #[tokio::test]
    async fn test_media_rejected_before_call() {
        let client = RigCompletionClient::claude_haiku();
        let request = CompletionRequest::text("diagnoseCropFlow", "Photo:")
            .with_media(vec![MediaPart::from_bytes("image/png", b"png")]);

        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
