//! Prompt-invocation wrapper.
//!
//! A [`PromptFlow`] binds an input type, an output type and a prompt template
//! to one completion call: validate, render, attach media, submit with the
//! output schema, then parse the reply strictly.

use std::marker::PhantomData;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use agri_assist_core::{
    schema::{output_schema, strip_code_fence},
    template::PromptTemplate,
    traits::{CompletionClient, CompletionRequest, PromptInput},
    Error, Result,
};

/// A named flow from `I` to `O` through the completion service.
pub struct PromptFlow<I, O> {
    name: &'static str,
    template: PromptTemplate,
    output_schema: Value,
    client: Arc<dyn CompletionClient>,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> PromptFlow<I, O>
where
    I: PromptInput,
    O: DeserializeOwned + JsonSchema,
{
    /// Compile the template and derive the output schema.
    pub fn new(
        name: &'static str,
        template: &str,
        client: Arc<dyn CompletionClient>,
    ) -> Result<Self> {
        Ok(Self {
            name,
            template: PromptTemplate::new(name, template)?,
            output_schema: output_schema::<O>(),
            client,
            _marker: PhantomData,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn output_schema(&self) -> &Value {
        &self.output_schema
    }

    /// Run the flow once. Nothing is retried.
    pub async fn run(&self, input: &I) -> Result<O> {
        input.validate()?;

        let prompt = self.template.render(input)?;
        let media = input.media()?;

        let request = CompletionRequest::text(self.name, prompt)
            .with_media(media)
            .with_output_schema(self.output_schema.clone());

        tracing::debug!(
            flow = %self.name,
            model = %self.client.model_name(),
            prompt_len = request.prompt.len(),
            media = request.media.len(),
            "Invoking flow"
        );

        let response = self.client.generate(&request).await.map_err(|e| {
            tracing::warn!(flow = %self.name, error = %e, "Completion call failed");
            e
        })?;

        let payload = match response.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => {
                tracing::warn!(flow = %self.name, "Completion returned no payload");
                return Err(Error::empty_response(format!(
                    "{} returned no output",
                    self.name
                )));
            }
        };

        let output = serde_json::from_str::<O>(strip_code_fence(payload)).map_err(|e| {
            tracing::warn!(flow = %self.name, error = %e, "Output failed schema validation");
            Error::schema_violation(self.name, e.to_string())
        })?;

        tracing::info!(
            flow = %self.name,
            total_tokens = response.usage.total_tokens,
            "Flow completed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_assist_core::mocks::{MockCompletionClient, MockReply};
    use agri_assist_core::types::{
        ChatInput, ChatOutput, FarmerProfile, FinancialAdviceInput, FinancialAdviceOutput,
    };
    use serde_json::json;

    fn chat_flow(client: Arc<MockCompletionClient>) -> PromptFlow<ChatInput, ChatOutput> {
        PromptFlow::new("chatFlow", "Answer: {{ query }}", client).unwrap()
    }

    fn chat(query: &str) -> ChatInput {
        ChatInput {
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_parses_output() {
        let client = Arc::new(MockCompletionClient::json(json!({"response": "Hi there"})));
        let flow = chat_flow(client.clone());

        let output = flow.run(&chat("hello")).await.unwrap();
        assert_eq!(output.response, "Hi there");

        let request = client.last_request().unwrap();
        assert_eq!(request.flow, "chatFlow");
        assert_eq!(request.prompt, "Answer: hello");
        assert_eq!(request.output_schema.as_ref(), Some(flow.output_schema()));
    }

    #[tokio::test]
    async fn test_invalid_input_skips_call() {
        let client = Arc::new(MockCompletionClient::json(json!({"response": "x"})));
        let flow = chat_flow(client.clone());

        let err = flow.run(&chat("   ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_payload() {
        let client = Arc::new(MockCompletionClient::new(vec![
            MockReply::Empty,
            MockReply::Text("  \n".to_string()),
        ]));
        let flow = chat_flow(client);

        assert!(matches!(
            flow.run(&chat("hello")).await,
            Err(Error::EmptyResponse(_))
        ));
        assert!(matches!(
            flow.run(&chat("hello")).await,
            Err(Error::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_strict_parsing() {
        let flow = chat_flow(Arc::new(MockCompletionClient::new(vec![
            MockReply::Text(r#"{"response": "ok", "extra": 1}"#.to_string()),
            MockReply::Text(r#"{"answer": "ok"}"#.to_string()),
            MockReply::Text(r#"{"response": 42}"#.to_string()),
            MockReply::Text("not json".to_string()),
        ])));

        for _ in 0..4 {
            let err = flow.run(&chat("hello")).await.unwrap_err();
            assert!(
                matches!(err, Error::SchemaViolation { ref flow, .. } if flow == "chatFlow"),
                "unexpected error: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_code_fence_unwrapped() {
        let client = Arc::new(MockCompletionClient::constant(
            "```json\n{\"response\": \"fenced\"}\n```",
        ));
        let output = chat_flow(client).run(&chat("hello")).await.unwrap();
        assert_eq!(output.response, "fenced");
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let flow = chat_flow(Arc::new(MockCompletionClient::failing(MockReply::Unavailable)));
        assert!(matches!(
            flow.run(&chat("hello")).await,
            Err(Error::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_nested_fields_and_absent_optionals() {
        let client = Arc::new(MockCompletionClient::json(json!({
            "advice": "Start small.",
            "opportunities": []
        })));
        let flow: PromptFlow<FinancialAdviceInput, FinancialAdviceOutput> = PromptFlow::new(
            "financialAdviceFlow",
            "Location: {{ profile.location }}|Land: {{ profile.landSize }}|{{ query }}",
            client.clone(),
        )
        .unwrap();

        let input = FinancialAdviceInput {
            query: "Should I take a tractor loan?".to_string(),
            profile: FarmerProfile {
                location: Some("Nashik".to_string()),
                ..Default::default()
            },
        };
        flow.run(&input).await.unwrap();

        assert_eq!(
            client.last_request().unwrap().prompt,
            "Location: Nashik|Land: |Should I take a tractor loan?"
        );
    }

    #[test]
    fn test_bad_template_rejected() {
        let client = Arc::new(MockCompletionClient::constant("{}"));
        let result: Result<PromptFlow<ChatInput, ChatOutput>> =
            PromptFlow::new("chatFlow", "{{ query", client);
        assert!(matches!(result, Err(Error::Template(_))));
    }
}
