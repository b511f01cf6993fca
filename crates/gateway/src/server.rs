//! Axum-based HTTP server for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use agri_assist_core::{
    config::{GatewayConfig, ServerConfig},
    traits::{CompletionClient, SpeechSynthesizer},
    types::{
        AssistInput, AssistOutput, ChatInput, ChatOutput, CropDiagnosisInput,
        CropDiagnosisOutput, CropManagementInput, CropManagementOutput, FinancialAdviceInput,
        FinancialAdviceOutput, OrchestrateInput, OrchestrateOutput, RecognitionErrorReply,
        RecognitionErrorReport, TextToSpeechInput, TextToSpeechOutput,
    },
    Error, ErrorKind, Result,
};

use crate::assist::AssistFlow;
use crate::features::FeatureFlows;
use crate::orchestrator::{Orchestrator, ORCHESTRATOR_FLOW};
use crate::tts::SpeechFlow;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub speech: Arc<SpeechFlow>,
    pub assist: AssistFlow,
    pub features: FeatureFlows,
    /// Upper bound for one flow, external calls included.
    pub request_timeout: Duration,
}

impl AppState {
    /// Build every flow over the two service clients.
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let orchestrator = Arc::new(Orchestrator::new(completion.clone())?);
        let speech = Arc::new(SpeechFlow::new(synthesizer));

        Ok(Self {
            assist: AssistFlow::new(orchestrator.clone(), speech.clone()),
            features: FeatureFlows::new(completion)?,
            orchestrator,
            speech,
            request_timeout,
        })
    }

    /// Run one flow under the request timeout, tagged with a fresh trace id.
    async fn run<T, F>(&self, flow: &'static str, fut: F) -> std::result::Result<Json<T>, ApiError>
    where
        F: Future<Output = Result<T>>,
        T: Serialize,
    {
        let trace_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("flow", flow = %flow, trace_id = %trace_id);
        let timeout = self.request_timeout;

        let outcome = async move {
            tracing::info!("Processing request");
            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(format!(
                    "{} did not complete within {} ms",
                    flow,
                    timeout.as_millis()
                ))),
            }
        }
        .instrument(span)
        .await;

        outcome.map(Json).map_err(|error| ApiError::new(error, trace_id))
    }
}

/// Gateway server.
pub struct GatewayServer {
    server: ServerConfig,
    gateway: GatewayConfig,
    state: Arc<AppState>,
}

impl GatewayServer {
    pub fn new(server: ServerConfig, gateway: GatewayConfig, state: AppState) -> Self {
        Self {
            server,
            gateway,
            state: Arc::new(state),
        }
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/v1/orchestrate", post(orchestrate_handler))
            .route("/v1/assist", post(assist_handler))
            .route("/v1/tts", post(tts_handler))
            .route("/v1/recognition-error", post(recognition_error_handler))
            .route("/v1/crop-diagnosis", post(crop_diagnosis_handler))
            .route("/v1/financial-advice", post(financial_advice_handler))
            .route("/v1/crop-management", post(crop_management_handler))
            .route("/v1/chat", post(chat_handler))
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::max(self.gateway.max_body_bytes))
            .layer(cors_layer(&self.gateway.allowed_origins))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

// =============================================================================
// Errors
// =============================================================================

/// Error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub trace_id: String,
}

/// A failed flow, rendered as [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    trace_id: String,
}

impl ApiError {
    pub fn new(error: Error, trace_id: String) -> Self {
        Self { error, trace_id }
    }

    fn rejected(rejection: JsonRejection) -> Self {
        Self::new(
            Error::invalid_request(rejection.body_text()),
            Uuid::new_v4().to_string(),
        )
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::SchemaViolation | ErrorKind::EmptyResponse => StatusCode::BAD_GATEWAY,
        ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Encoding | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let status = status_for(kind);

        if status.is_server_error() {
            tracing::error!(trace_id = %self.trace_id, code = kind.code(), error = %self.error, "Request failed");
        } else {
            tracing::warn!(trace_id = %self.trace_id, code = kind.code(), error = %self.error, "Request rejected");
        }

        let body = ErrorResponse {
            code: kind.code().to_string(),
            message: self.error.to_string(),
            trace_id: self.trace_id,
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn orchestrate_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<OrchestrateInput>, JsonRejection>,
) -> ApiResult<OrchestrateOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    state
        .run(ORCHESTRATOR_FLOW, state.orchestrator.orchestrate(&input.query))
        .await
}

async fn assist_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AssistInput>, JsonRejection>,
) -> ApiResult<AssistOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    state.run("assistFlow", state.assist.run(&input)).await
}

async fn tts_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TextToSpeechInput>, JsonRejection>,
) -> ApiResult<TextToSpeechOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    state.run("textToSpeechFlow", state.speech.run(&input)).await
}

async fn recognition_error_handler(
    payload: std::result::Result<Json<RecognitionErrorReport>, JsonRejection>,
) -> ApiResult<RecognitionErrorReply> {
    let Json(report) = payload.map_err(ApiError::rejected)?;
    let reply = RecognitionErrorReply::from(&report);

    if !reply.ignorable {
        tracing::warn!(error = ?report.error, lang = %reply.lang, "Speech recognition failed");
    }

    Ok(Json(reply))
}

async fn crop_diagnosis_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CropDiagnosisInput>, JsonRejection>,
) -> ApiResult<CropDiagnosisOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    let flow = &state.features.crop_diagnosis;
    state.run(flow.name(), flow.run(&input)).await
}

async fn financial_advice_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<FinancialAdviceInput>, JsonRejection>,
) -> ApiResult<FinancialAdviceOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    let flow = &state.features.financial_advice;
    state.run(flow.name(), flow.run(&input)).await
}

async fn crop_management_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CropManagementInput>, JsonRejection>,
) -> ApiResult<CropManagementOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    let flow = &state.features.crop_management;
    state.run(flow.name(), flow.run(&input)).await
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatInput>, JsonRejection>,
) -> ApiResult<ChatOutput> {
    let Json(input) = payload.map_err(ApiError::rejected)?;
    let flow = &state.features.chat;
    state.run(flow.name(), flow.run(&input)).await
}
