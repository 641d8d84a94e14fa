use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Failures of the report pipeline. Every variant is terminal for the
/// request that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Please provide an API key")]
    MissingCredential,

    #[error("Please describe the incident")]
    MissingScenario,

    #[error("API Error: {message}")]
    Provider { message: String },

    #[error("Error {status}: {body}")]
    Generation { status: u16, body: String },

    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Connection Failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ReportError {
    /// Stable label used for span `error.type` and the response `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::MissingCredential => "missing_credential",
            ReportError::MissingScenario => "missing_scenario",
            ReportError::Provider { .. } => "provider_error",
            ReportError::Generation { .. } => "generation_error",
            ReportError::Authentication { .. } => "auth_error",
            ReportError::Connection(_) => "network_error",
            ReportError::Timeout(_) => "timeout",
            ReportError::MalformedResponse(_) => "malformed_response",
            ReportError::InvalidEndpoint(_) => "invalid_endpoint",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportError::MissingCredential | ReportError::MissingScenario => {
                StatusCode::BAD_REQUEST
            }
            ReportError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ReportError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ReportError::InvalidEndpoint(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ReportError::Provider { .. }
            | ReportError::Generation { .. }
            | ReportError::Connection(_)
            | ReportError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            AppError::Report(err) => (err.status_code(), err.kind(), err.to_string()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error.type = kind, error = %error_message, "Report request failed");
        } else {
            tracing::warn!(error.type = kind, error = %error_message, "Report request rejected");
        }

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "kind": kind,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "kind": kind,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
