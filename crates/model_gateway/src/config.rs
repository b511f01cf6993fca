use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use agri_assist_core::{Error, Result};

/// Provider list loaded from `providers.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub providers: Vec<ProviderDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDefinition {
    pub name: String,
    pub base_url: Option<String>,
    pub models: Vec<ModelDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub id: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl ProviderConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path).await
            .map_err(|e| Error::internal(format!("Failed to read provider config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::internal(format!("Failed to parse provider config: {}", e)))
    }
}
