use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub model_gateway: ModelGatewayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Upper bound for one flow call, external service included.
    pub request_timeout_ms: u64,
    pub allowed_origins: Vec<String>,
    /// Largest accepted request body (crop photos travel inline).
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelGatewayConfig {
    /// `gemini`, `openai` or `anthropic`.
    pub default_provider: String,
    /// Completion model for the text flows.
    pub model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub gemini_base_url: String,
    pub request_timeout_ms: u64,
    /// Optional provider list in `providers.json` format.
    pub providers_file: Option<String>,

    /// OpenAI and Anthropic keys are read from their usual environment
    /// variables by the Rig clients.
    pub gemini_api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("AGRI_ASSIST_ENV").unwrap_or_else(|_| "development".into());

        let s = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut cfg: Self = s.try_deserialize()?;
        cfg.apply_key_env_fallbacks();
        Ok(cfg)
    }

    /// Honor `GEMINI_API_KEY` / `GOOGLE_API_KEY` when the config has no key.
    pub fn apply_key_env_fallbacks(&mut self) {
        let mg = &mut self.model_gateway;
        if mg.gemini_api_key.is_none() {
            mg.gemini_api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok()
                .map(Secret::new);
        }
    }
}

/// Seed every key from [`AppConfig::default`] so partial files and bare
/// environment overrides still deserialize.
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let d = AppConfig::default();
    builder
        .set_default("server.host", d.server.host)?
        .set_default("server.port", i64::from(d.server.port))?
        .set_default("gateway.request_timeout_ms", d.gateway.request_timeout_ms as i64)?
        .set_default("gateway.allowed_origins", d.gateway.allowed_origins)?
        .set_default("gateway.max_body_bytes", d.gateway.max_body_bytes as i64)?
        .set_default("model_gateway.default_provider", d.model_gateway.default_provider)?
        .set_default("model_gateway.model", d.model_gateway.model)?
        .set_default("model_gateway.tts_model", d.model_gateway.tts_model)?
        .set_default("model_gateway.tts_voice", d.model_gateway.tts_voice)?
        .set_default("model_gateway.gemini_base_url", d.model_gateway.gemini_base_url)?
        .set_default(
            "model_gateway.request_timeout_ms",
            d.model_gateway.request_timeout_ms as i64,
        )?
        .set_default("logging.filter", d.logging.filter)?
        .set_default("logging.json", d.logging.json)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
            },
            gateway: GatewayConfig {
                request_timeout_ms: 60_000,
                allowed_origins: vec!["*".into()],
                max_body_bytes: 10 * 1024 * 1024, // 10MB
            },
            model_gateway: ModelGatewayConfig {
                default_provider: "gemini".into(),
                model: "gemini-2.0-flash".into(),
                tts_model: "gemini-2.5-flash-preview-tts".into(),
                tts_voice: "Algenib".into(),
                gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
                request_timeout_ms: 45_000,
                providers_file: None,
                gemini_api_key: None,
            },
            logging: LoggingConfig {
                filter: "info,agri_assist=debug".into(),
                json: false,
            },
        }
    }
}
