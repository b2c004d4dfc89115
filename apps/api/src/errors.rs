use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Enhancement agent '{identity}' failed: {cause}")]
    AgentFailed { identity: String, cause: String },

    #[error("Grading failed: {cause}")]
    GradingFailed { cause: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MalformedDocument(msg) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_DOCUMENT", msg.clone())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::AgentFailed { identity, cause } => {
                tracing::error!("Agent '{identity}' failed: {cause}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AGENT_FAILURE",
                    "An enhancement agent failed to produce a result".to_string(),
                )
            }
            AppError::GradingFailed { cause } => {
                tracing::error!("Grading failed: {cause}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GRADING_FAILURE",
                    "The grading agent failed to select a result".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
