use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::PromptInput;
use crate::validate::{require_non_blank, Validate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    /// The user's message.
    pub query: String,
}

impl Validate for ChatInput {
    fn validate(&self) -> Result<()> {
        require_non_blank("query", &self.query)
    }
}

impl PromptInput for ChatInput {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChatOutput {
    /// The AI's response to the user's message.
    pub response: String,
}
