//! GeminiClient against a local stub of the generateContent endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use secrecy::Secret;
use serde_json::{json, Value};

use agri_assist_core::traits::{CompletionClient, CompletionRequest, SpeechSynthesizer};
use agri_assist_core::Error;
use agri_assist_model_gateway::{GeminiClient, GeminiConfig};

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Recorded) {
    let recorded = Recorded::default();

    let app = Router::new()
        .route(
            "/models/:action",
            post(
                move |State(recorded): State<Recorded>,
                      Path(action): Path<String>,
                      headers: HeaderMap,
                      Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let key = headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        recorded.calls.lock().unwrap().push((action, key, body));
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn client(base_url: &str) -> GeminiClient {
    let mut config = GeminiConfig::new(Secret::new("test-key".to_string())).with_base_url(base_url);
    config.timeout = Duration::from_secs(5);
    GeminiClient::new(config).unwrap()
}

#[tokio::test]
async fn test_structured_completion() {
    let (base_url, recorded) = spawn_stub(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"agent\":\"Market Prices\"}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 8, "totalTokenCount": 128}
        }),
    )
    .await;

    let request = CompletionRequest::text("orchestratorFlow", "classify this")
        .with_output_schema(json!({"type": "object"}));
    let response = client(&base_url).generate(&request).await.unwrap();

    assert_eq!(response.text.as_deref(), Some("{\"agent\":\"Market Prices\"}"));
    assert_eq!(response.usage.total_tokens, 128);

    let calls = recorded.calls.lock().unwrap();
    let (action, key, body) = &calls[0];
    assert_eq!(action, "gemini-2.0-flash:generateContent");
    assert_eq!(key.as_deref(), Some("test-key"));
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
}

#[tokio::test]
async fn test_speech_chunks_in_order() {
    // "AQI=" -> [1, 2], "AwQ=" -> [3, 4]
    let (base_url, recorded) = spawn_stub(
        StatusCode::OK,
        json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AQI="}},
                {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AwQ="}}
            ]}}]
        }),
    )
    .await;

    let speech = client(&base_url).synthesize("Namaste").await.unwrap();
    assert_eq!(speech.chunks, vec![vec![1, 2], vec![3, 4]]);
    assert_eq!(speech.declared_rate(), Some(24000));

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls[0].0, "gemini-2.5-flash-preview-tts:generateContent");
}

#[tokio::test]
async fn test_speech_without_audio() {
    let (base_url, _) = spawn_stub(
        StatusCode::OK,
        json!({"candidates": [{"content": {"parts": [{"text": "I cannot speak"}]}}]}),
    )
    .await;

    let err = client(&base_url).synthesize("Hello").await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse(ref m) if m == "no media returned"));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (StatusCode::TOO_MANY_REQUESTS, "unavailable"),
        (StatusCode::BAD_REQUEST, "provider"),
    ];

    for (status, expected) in cases {
        let (base_url, _) =
            spawn_stub(status, json!({"error": {"message": "boom"}})).await;
        let err = client(&base_url)
            .generate(&CompletionRequest::text("chatFlow", "hi"))
            .await
            .unwrap_err();

        match expected {
            "unavailable" => assert!(matches!(err, Error::ServiceUnavailable(ref m) if m.contains("boom"))),
            _ => assert!(matches!(err, Error::ModelProvider(ref m) if m.contains("boom"))),
        }
    }
}

#[tokio::test]
async fn test_unreachable_service() {
    // Nothing listens on port 9 of localhost.
    let err = client("http://127.0.0.1:9")
        .generate(&CompletionRequest::text("chatFlow", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
}
