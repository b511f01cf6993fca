#![deny(unused)]
//! Model Gateway for AgriAssist.
//!
//! This crate provides:
//! - Gemini REST client (structured completions + speech synthesis)
//! - Rig client adapter for OpenAI / Anthropic completions
//! - Client construction from configuration

pub mod config;
pub mod gemini;
pub mod rig_client;

use std::sync::Arc;
use std::time::Duration;

pub use gemini::{GeminiClient, GeminiConfig};
pub use rig_client::{RigCompletionClient, RigConfig, RigProvider};

use agri_assist_core::{
    config::ModelGatewayConfig,
    traits::{CompletionClient, SpeechSynthesizer},
    Error, Result,
};
use config::ProviderConfig;

/// Clients for both external service boundaries.
pub struct ServiceClients {
    pub completion: Arc<dyn CompletionClient>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

/// Build the Gemini client from application config.
pub fn create_gemini_client(cfg: &ModelGatewayConfig) -> Result<GeminiClient> {
    let api_key = cfg.gemini_api_key.clone().ok_or_else(|| {
        Error::ModelProvider("No Gemini API key. Set GEMINI_API_KEY".to_string())
    })?;

    let mut config = GeminiConfig::new(api_key).with_base_url(&cfg.gemini_base_url);
    if cfg.default_provider == "gemini" {
        config = config.with_model(&cfg.model);
    }
    config.tts_model = cfg.tts_model.clone();
    config.voice = cfg.tts_voice.clone();
    config.timeout = Duration::from_millis(cfg.request_timeout_ms);

    GeminiClient::new(config)
}

/// Create a completion client from a `providers.json` provider list.
pub fn create_client_from_config(config: &ProviderConfig) -> Result<RigCompletionClient> {
    for provider in &config.providers {
        let Some(model) = provider.models.first() else {
            continue;
        };
        match provider.name.to_lowercase().as_str() {
            "openai" => return Ok(RigCompletionClient::new(RigConfig::openai(&model.id))),
            "anthropic" => return Ok(RigCompletionClient::new(RigConfig::anthropic(&model.id))),
            _ => continue,
        }
    }

    Err(Error::ModelProvider(
        "No supported provider found in config".to_string(),
    ))
}

/// Wire the completion and speech clients.
///
/// Speech always goes through Gemini; completions follow `default_provider`,
/// or the provider list when one is given.
pub fn create_service_clients(
    cfg: &ModelGatewayConfig,
    providers: Option<&ProviderConfig>,
) -> Result<ServiceClients> {
    let gemini = Arc::new(create_gemini_client(cfg)?);

    let completion: Arc<dyn CompletionClient> = match providers {
        Some(list) => Arc::new(create_client_from_config(list)?),
        None => match cfg.default_provider.to_lowercase().as_str() {
            "gemini" => gemini.clone(),
            "openai" => Arc::new(RigCompletionClient::new(RigConfig::openai(&cfg.model))),
            "anthropic" => Arc::new(RigCompletionClient::new(RigConfig::anthropic(&cfg.model))),
            other => {
                return Err(Error::ModelProvider(format!("Unknown provider: {}", other)));
            }
        },
    };

    tracing::info!(
        completion_model = %completion.model_name(),
        tts_model = %cfg.tts_model,
        "Model gateway initialized"
    );

    Ok(ServiceClients {
        completion,
        speech: gemini,
    })
}
