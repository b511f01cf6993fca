//! Assist flow: classify a request, then answer it out loud.

use std::sync::Arc;

use agri_assist_core::{
    types::{AssistInput, AssistOutput, Language, OrchestrateOutput},
    validate::Validate,
    Result,
};

use crate::orchestrator::Orchestrator;
use crate::tts::SpeechFlow;

pub struct AssistFlow {
    orchestrator: Arc<Orchestrator>,
    speech: Arc<SpeechFlow>,
}

impl AssistFlow {
    pub fn new(orchestrator: Arc<Orchestrator>, speech: Arc<SpeechFlow>) -> Self {
        Self {
            orchestrator,
            speech,
        }
    }

    /// Orchestration errors fail the call; speech errors only drop the audio.
    pub async fn run(&self, input: &AssistInput) -> Result<AssistOutput> {
        input.validate()?;

        let decision = self.orchestrator.orchestrate(&input.query).await?;
        let reply = spoken_reply(&decision, input.language);

        let audio_data_uri = match self.speech.speak(&reply).await {
            Ok(output) => Some(output.audio_data_uri),
            Err(e) => {
                tracing::warn!(
                    agent = %decision.agent,
                    language = %input.language,
                    error = %e,
                    "Speech synthesis failed, returning result without audio"
                );
                None
            }
        };

        Ok(AssistOutput {
            route: decision.agent.route().map(str::to_string),
            agent: decision.agent,
            clarifying_question: decision.clarifying_question,
            audio_data_uri,
        })
    }
}

/// The clarifying question when there is one, otherwise a navigation notice.
pub fn spoken_reply(decision: &OrchestrateOutput, language: Language) -> String {
    match &decision.clarifying_question {
        Some(question) if !question.trim().is_empty() => question.clone(),
        _ if decision.agent.is_unknown() => language.not_understood().to_string(),
        _ => language.navigating_to(decision.agent),
    }
}
