use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::crop::MIN_DESCRIPTION_CHARS;
use crate::error::Result;
use crate::traits::PromptInput;
use crate::validate::{require_min_chars, Validate};

/// The farmer's profile information.
///
/// Every field is optional; absent fields render as empty in prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    pub location: Option<String>,
    pub experience: Option<String>,
    pub farming_type: Option<String>,
    pub land_size: Option<String>,
    pub investment_interest: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAdviceInput {
    /// The farmer's question about financial matters.
    pub query: String,
    #[serde(default)]
    pub profile: FarmerProfile,
}

impl Validate for FinancialAdviceInput {
    fn validate(&self) -> Result<()> {
        require_min_chars("query", &self.query, MIN_DESCRIPTION_CHARS)
    }
}

impl PromptInput for FinancialAdviceInput {}

/// A potential financial opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Opportunity {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FinancialAdviceOutput {
    /// The generated financial advice.
    pub advice: String,
    /// A list of potential financial opportunities.
    pub opportunities: Vec<Opportunity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_fields_optional() {
        let input: FinancialAdviceInput =
            serde_json::from_value(json!({"query": "Which crop loan suits me?"})).unwrap();
        assert!(input.profile.location.is_none());
        input.validate().unwrap();
    }

    #[test]
    fn test_short_query_rejected() {
        let input = FinancialAdviceInput {
            query: "loan?".into(),
            profile: FarmerProfile::default(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_output_requires_opportunities() {
        let result =
            serde_json::from_value::<FinancialAdviceOutput>(json!({"advice": "Save more."}));
        assert!(result.is_err());
    }
}
