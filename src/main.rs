#![deny(unused)]
//! AgriAssist - voice-first farming assistant backend.
//!
//! Classifies farmer requests into app features, runs the feature flows
//! against a hosted model, and speaks replies back as WAV audio.

mod telemetry;

use std::time::Duration;

use agri_assist_core::config::AppConfig;
use agri_assist_gateway::{AppState, GatewayServer};
use agri_assist_model_gateway::{config::ProviderConfig, create_service_clients};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let config = AppConfig::load()?;
    telemetry::configure_tracing(&config.logging)?;

    tracing::info!("Starting AgriAssist v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Model Gateway
    // =========================================================================
    let providers = match &config.model_gateway.providers_file {
        Some(path) => {
            tracing::info!(path = %path, "Loading provider config");
            Some(ProviderConfig::load(path).await?)
        }
        None => None,
    };

    let clients = create_service_clients(&config.model_gateway, providers.as_ref())?;

    // =========================================================================
    // Gateway
    // =========================================================================
    let state = AppState::new(
        clients.completion,
        clients.speech,
        Duration::from_millis(config.gateway.request_timeout_ms),
    )?;

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        provider = %config.model_gateway.default_provider,
        "Gateway configured"
    );

    GatewayServer::new(config.server, config.gateway, state)
        .run()
        .await?;

    Ok(())
}
