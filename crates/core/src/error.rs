//! Error types for AgriAssist.

use thiserror::Error;

/// Result type alias using AgriAssist's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for AgriAssist.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Caller-supplied input failed its schema before any external call.
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Completion / Speech Service Errors
    // =========================================================================
    /// The service response did not match the declared output shape.
    #[error("Schema violation in {flow}: {message}")]
    SchemaViolation { flow: String, message: String },

    /// The service returned no output payload.
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Network failure or 5xx from an external service.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-transport provider failure (4xx, auth, unsupported feature).
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    // =========================================================================
    // Audio Errors
    // =========================================================================
    #[error("Encoding error: {0}")]
    Encoding(String),

    // =========================================================================
    // Template Errors
    // =========================================================================
    #[error("Template rendering error: {0}")]
    Template(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    SchemaViolation,
    EmptyResponse,
    ServiceUnavailable,
    Timeout,
    Encoding,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::SchemaViolation => "SCHEMA_VIOLATION",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Encoding => "ENCODING_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl Error {
    /// Create a validation error for a named input field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a schema violation error for a flow.
    pub fn schema_violation(flow: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            flow: flow.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an empty response error.
    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    /// Create a service unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create an encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify this error for callers that present it to users.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } | Error::InvalidRequest(_) => ErrorKind::Validation,
            Error::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Error::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Error::ServiceUnavailable(_) | Error::ModelProvider(_) => {
                ErrorKind::ServiceUnavailable
            }
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Template(_)
            | Error::Config(_)
            | Error::Serialization(_)
            | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a caller may reasonably resubmit the same request.
    ///
    /// Nothing in this workspace retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ServiceUnavailable | ErrorKind::Timeout
        )
    }
}
