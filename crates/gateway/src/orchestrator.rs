//! Intent orchestrator: maps one utterance to one feature label.

use std::sync::Arc;

use agri_assist_core::{
    traits::CompletionClient,
    types::{OrchestrateInput, OrchestrateOutput},
    Result,
};

use crate::flow::PromptFlow;

pub const ORCHESTRATOR_FLOW: &str = "orchestratorFlow";

const ORCHESTRATOR_PROMPT: &str = r#"You are an AI orchestrator for a farming assistance app called AgriAssist AI. Your job is to understand the user's request and determine which of the available agents can best handle it.

The available agents are:
- Crop Diagnosis: For identifying crop diseases and issues from images and descriptions.
- Weather Reports: For providing current weather and forecasts.
- Discussion Forums: For connecting with other farmers.
- Government Schemes: For finding information about government support programs.
- Farmer's Training: For accessing educational materials and training opportunities.
- Crop Management: For analyzing soil data and getting crop management advice.
- Financial Advice: For getting advice on loans, investments, and other financial matters.
- Market Prices: For viewing current market prices of crops.

Analyze the user's query: "{{ query }}"

Based on the query, select the most appropriate agent. If the request is ambiguous or could be handled by multiple agents, select the most likely one. If the request is not related to any of the agents, select 'Unknown'.

You can also ask a clarifying question if the user's request is unclear. For example, if the user says "I need help with my finances", you could ask "What specific financial question do you have?".
"#;

/// LLM-backed intent classifier over the closed feature set.
pub struct Orchestrator {
    flow: PromptFlow<OrchestrateInput, OrchestrateOutput>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Result<Self> {
        Ok(Self {
            flow: PromptFlow::new(ORCHESTRATOR_FLOW, ORCHESTRATOR_PROMPT, client)?,
        })
    }

    /// Classify `query`. Blank input fails before the service is called.
    pub async fn orchestrate(&self, query: &str) -> Result<OrchestrateOutput> {
        let output = self.flow.run(&OrchestrateInput::new(query)).await?;

        tracing::info!(
            agent = %output.agent,
            clarifying = output.clarifying_question.is_some(),
            "Request classified"
        );

        Ok(output)
    }
}
