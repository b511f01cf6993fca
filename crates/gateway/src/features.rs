//! Feature flows behind the individual app pages.

use std::sync::Arc;

use agri_assist_core::{
    traits::CompletionClient,
    types::{
        ChatInput, ChatOutput, CropDiagnosisInput, CropDiagnosisOutput, CropManagementInput,
        CropManagementOutput, FinancialAdviceInput, FinancialAdviceOutput,
    },
    Result,
};

use crate::flow::PromptFlow;

pub type CropDiagnosisFlow = PromptFlow<CropDiagnosisInput, CropDiagnosisOutput>;
pub type FinancialAdviceFlow = PromptFlow<FinancialAdviceInput, FinancialAdviceOutput>;
pub type CropManagementFlow = PromptFlow<CropManagementInput, CropManagementOutput>;
pub type ChatFlow = PromptFlow<ChatInput, ChatOutput>;

const CROP_DIAGNOSIS_PROMPT: &str = r#"You are an expert agricultural advisor specializing in diagnosing crop illnesses and issues.

You will use the following information to diagnose the crop and its issues, and suggest solutions.

Description: {{ description }}
Photo: (attached)

Respond in the same language as the description: {{ language }}.

Provide a detailed diagnosis of the issue and suggest practical solutions for the farmer to implement.
"#;

const FINANCIAL_ADVICE_PROMPT: &str = r#"You are an expert financial advisor for farmers.

A farmer has the following profile:
- Location: {{ profile.location }}
- Experience: {{ profile.experience }}
- Farming Type: {{ profile.farmingType }}
- Land Size: {{ profile.landSize }}
- Interested in Investment: {{ profile.investmentInterest }}

The farmer's query is: "{{ query }}"

Based on their profile and query, provide clear, actionable financial advice.
Also, identify and list relevant financial opportunities, such as government schemes, loans, or investment options.
Respond in a helpful and encouraging tone.
"#;

const CROP_MANAGEMENT_PROMPT: &str = r#"You are an agronomist advising a farmer on managing a growing crop.

- Crop: {{ cropType }}
- Growth stage: {{ growthStage }}
- Soil type: {{ soilType }}
- Location: {{ location }}

Give practical recommendations suited to this stage, soil and region covering:
1. Irrigation: water requirements and techniques.
2. Nutrient management: fertilization schedule and soil amendments.
3. Pest and disease control: likely threats and control measures, preferring integrated pest management.
4. Weed control: common weeds and how to manage them.

Finish with a short summary and a list of concrete action steps for the coming weeks.
Respond in {{ language }}.
"#;

const CHAT_PROMPT: &str = r#"You are a helpful assistant for the Pratham Kishan app, a farming assistance application.

Answer the user's query: "{{ query }}"

Provide a helpful and concise response. If the query is about a feature in the app, you can suggest they use it. The available features are: Crop Diagnosis, Weather Reports, Discussion Forums, Government Schemes, Farmer's Training, Crop Management, Financial Advice, and Market Prices.
"#;

/// Every page-level flow, sharing one completion client.
pub struct FeatureFlows {
    pub crop_diagnosis: CropDiagnosisFlow,
    pub financial_advice: FinancialAdviceFlow,
    pub crop_management: CropManagementFlow,
    pub chat: ChatFlow,
}

impl FeatureFlows {
    pub fn new(client: Arc<dyn CompletionClient>) -> Result<Self> {
        Ok(Self {
            crop_diagnosis: PromptFlow::new("diagnoseCropFlow", CROP_DIAGNOSIS_PROMPT, client.clone())?,
            financial_advice: PromptFlow::new(
                "financialAdviceFlow",
                FINANCIAL_ADVICE_PROMPT,
                client.clone(),
            )?,
            crop_management: PromptFlow::new(
                "cropManagementFlow",
                CROP_MANAGEMENT_PROMPT,
                client.clone(),
            )?,
            chat: PromptFlow::new("chatFlow", CHAT_PROMPT, client)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_assist_core::mocks::MockCompletionClient;
    use agri_assist_core::types::{FarmerProfile, Language};
    use agri_assist_core::Error;
    use serde_json::json;

    const PHOTO: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[tokio::test]
    async fn test_crop_diagnosis_attaches_photo() {
        let client = Arc::new(MockCompletionClient::json(json!({
            "diagnosis": "Leaf rust",
            "solutions": "Apply a fungicide."
        })));
        let flows = FeatureFlows::new(client.clone()).unwrap();

        let output = flows
            .crop_diagnosis
            .run(&CropDiagnosisInput {
                photo_data_uri: PHOTO.to_string(),
                description: "Orange spots on wheat leaves".to_string(),
                language: Language::Hindi,
            })
            .await
            .unwrap();
        assert_eq!(output.diagnosis, "Leaf rust");

        let request = client.last_request().unwrap();
        assert_eq!(request.flow, "diagnoseCropFlow");
        assert_eq!(request.media.len(), 1);
        assert_eq!(request.media[0].mime_type, "image/png");
        assert!(request.prompt.contains("Description: Orange spots on wheat leaves"));
        assert!(request.prompt.contains("description: Hindi."));
    }

    #[tokio::test]
    async fn test_short_inputs_rejected_before_call() {
        let client = Arc::new(MockCompletionClient::constant("{}"));
        let flows = FeatureFlows::new(client.clone()).unwrap();

        let err = flows
            .crop_diagnosis
            .run(&CropDiagnosisInput {
                photo_data_uri: PHOTO.to_string(),
                description: "spots".to_string(),
                language: Language::English,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "description"));

        let err = flows
            .financial_advice
            .run(&FinancialAdviceInput {
                query: "loan?".to_string(),
                profile: FarmerProfile::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "query"));

        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_financial_advice_profile_rendering() {
        let client = Arc::new(MockCompletionClient::json(json!({
            "advice": "Consider a crop loan.",
            "opportunities": [{"title": "Kisan Credit Card", "description": "Low-interest credit."}]
        })));
        let flows = FeatureFlows::new(client.clone()).unwrap();

        let output = flows
            .financial_advice
            .run(&FinancialAdviceInput {
                query: "How can I finance a drip irrigation system?".to_string(),
                profile: FarmerProfile {
                    location: Some("Pune".to_string()),
                    farming_type: Some("Organic".to_string()),
                    investment_interest: Some(true),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(output.opportunities.len(), 1);

        let prompt = client.last_request().unwrap().prompt;
        assert!(prompt.contains("- Location: Pune\n"));
        assert!(prompt.contains("- Experience: \n"));
        assert!(prompt.contains("- Farming Type: Organic\n"));
        assert!(prompt.contains("- Interested in Investment: true\n"));
    }

    #[tokio::test]
    async fn test_crop_management_output() {
        let client = Arc::new(MockCompletionClient::json(json!({
            "summary": "Healthy start.",
            "irrigation": "Water every 5 days.",
            "nutrientManagement": "Top-dress with urea.",
            "pestAndDiseaseControl": "Scout for aphids.",
            "weedControl": "Hand weed at 30 days.",
            "actionSteps": ["Irrigate", "Scout"]
        })));
        let flows = FeatureFlows::new(client.clone()).unwrap();

        let output = flows
            .crop_management
            .run(&CropManagementInput {
                crop_type: "Wheat".to_string(),
                growth_stage: "tillering".to_string(),
                soil_type: "loamy".to_string(),
                location: "Punjab, India".to_string(),
                language: Language::English,
            })
            .await
            .unwrap();
        assert_eq!(output.action_steps, vec!["Irrigate", "Scout"]);
        assert!(client.last_request().unwrap().prompt.contains("- Crop: Wheat"));
    }

    #[tokio::test]
    async fn test_chat() {
        let client = Arc::new(MockCompletionClient::json(json!({
            "response": "Try the Market Prices page."
        })));
        let flows = FeatureFlows::new(client.clone()).unwrap();

        let output = flows
            .chat
            .run(&ChatInput {
                query: "Where can I see onion rates?".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.response, "Try the Market Prices page.");
    }
}
