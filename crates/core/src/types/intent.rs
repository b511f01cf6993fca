use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::locale::Language;
use crate::error::Result;
use crate::traits::PromptInput;
use crate::validate::{require_non_blank, Validate};

// =============================================================================
// Agent Labels (Orchestrator Output)
// =============================================================================

/// Feature that should handle a user request.
///
/// The set is closed: parsing is exact, so `"crop diagnosis"` is not a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AgentLabel {
    // Identifying crop diseases and issues from images and descriptions.
    #[serde(rename = "Crop Diagnosis")]
    CropDiagnosis,
    // Current weather and forecasts.
    #[serde(rename = "Weather Reports")]
    WeatherReports,
    // Connecting with other farmers.
    #[serde(rename = "Discussion Forums")]
    DiscussionForums,
    // Government support programs.
    #[serde(rename = "Government Schemes")]
    GovernmentSchemes,
    // Educational materials and training opportunities.
    #[serde(rename = "Farmer's Training")]
    FarmersTraining,
    // Soil data analysis and crop management advice.
    #[serde(rename = "Crop Management")]
    CropManagement,
    // Loans, investments and other financial matters.
    #[serde(rename = "Financial Advice")]
    FinancialAdvice,
    // Current market prices of crops.
    #[serde(rename = "Market Prices")]
    MarketPrices,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl AgentLabel {
    /// Every label, in prompt order.
    pub const ALL: [AgentLabel; 9] = [
        AgentLabel::CropDiagnosis,
        AgentLabel::WeatherReports,
        AgentLabel::DiscussionForums,
        AgentLabel::GovernmentSchemes,
        AgentLabel::FarmersTraining,
        AgentLabel::CropManagement,
        AgentLabel::FinancialAdvice,
        AgentLabel::MarketPrices,
        AgentLabel::Unknown,
    ];

    /// Wire name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentLabel::CropDiagnosis => "Crop Diagnosis",
            AgentLabel::WeatherReports => "Weather Reports",
            AgentLabel::DiscussionForums => "Discussion Forums",
            AgentLabel::GovernmentSchemes => "Government Schemes",
            AgentLabel::FarmersTraining => "Farmer's Training",
            AgentLabel::CropManagement => "Crop Management",
            AgentLabel::FinancialAdvice => "Financial Advice",
            AgentLabel::MarketPrices => "Market Prices",
            AgentLabel::Unknown => "Unknown",
        }
    }

    /// Exact parse of a wire name. No case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == value)
    }

    /// Route of the feature page, `None` for `Unknown`.
    pub fn route(&self) -> Option<&'static str> {
        match self {
            AgentLabel::CropDiagnosis => Some("/crop-diagnosis"),
            AgentLabel::WeatherReports => Some("/weather"),
            AgentLabel::DiscussionForums => Some("/forums"),
            AgentLabel::GovernmentSchemes => Some("/schemes"),
            AgentLabel::FarmersTraining => Some("/training"),
            AgentLabel::CropManagement => Some("/crop-management"),
            AgentLabel::FinancialAdvice => Some("/financial-advice"),
            AgentLabel::MarketPrices => Some("/market-prices"),
            AgentLabel::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AgentLabel::Unknown)
    }
}

impl std::fmt::Display for AgentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// The user's request in text or voice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrateInput {
    /// The user's request in text or voice.
    pub query: String,
}

impl OrchestrateInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl Validate for OrchestrateInput {
    fn validate(&self) -> Result<()> {
        require_non_blank("query", &self.query)
    }
}

impl PromptInput for OrchestrateInput {}

/// The agent that can best handle the user's request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrchestrateOutput {
    /// The agent that can best handle the user's request.
    pub agent: AgentLabel,
    /// A question to ask the user to gather more information if needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifying_question: Option<String>,
}

// =============================================================================
// Assist (orchestrate + spoken reply)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistInput {
    pub query: String,
    #[serde(default)]
    pub language: Language,
}

impl Validate for AssistInput {
    fn validate(&self) -> Result<()> {
        require_non_blank("query", &self.query)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistOutput {
    pub agent: AgentLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarifying_question: Option<String>,
    /// Feature page to navigate to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Spoken reply, absent when speech synthesis failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_data_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_wire_names_roundtrip() {
        for label in AgentLabel::ALL {
            let value = serde_json::to_value(label).unwrap();
            assert_eq!(value, json!(label.as_str()));
            assert_eq!(AgentLabel::parse(label.as_str()), Some(label));
        }
    }

    #[test]
    fn test_label_parse_is_exact() {
        assert_eq!(AgentLabel::parse("crop diagnosis"), None);
        assert_eq!(AgentLabel::parse("CropDiagnosis"), None);
        assert!(serde_json::from_value::<AgentLabel>(json!("crop diagnosis")).is_err());
    }

    #[test]
    fn test_routes() {
        assert_eq!(AgentLabel::FarmersTraining.route(), Some("/training"));
        assert_eq!(AgentLabel::Unknown.route(), None);
        let routed = AgentLabel::ALL.iter().filter(|l| l.route().is_some()).count();
        assert_eq!(routed, 8);
    }

    #[test]
    fn test_output_null_question_is_absent() {
        let out: OrchestrateOutput =
            serde_json::from_value(json!({"agent": "Unknown", "clarifyingQuestion": null}))
                .unwrap();
        assert_eq!(out.agent, AgentLabel::Unknown);
        assert!(out.clarifying_question.is_none());
    }

    #[test]
    fn test_output_rejects_extra_fields() {
        let result = serde_json::from_value::<OrchestrateOutput>(
            json!({"agent": "Market Prices", "confidence": 0.9}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_query_invalid() {
        assert!(OrchestrateInput::new("   ").validate().is_err());
        assert!(OrchestrateInput::new("hello").validate().is_ok());
    }
}
