//! Axum route handler for the Enhancement API.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::pdf;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    /// Base64-encoded PDF payload.
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    /// Base64-encoded winning document, re-serialized through the codec.
    pub enhanced_resume: String,
    pub explanation: String,
}

/// POST /api/v1/resumes/enhance
///
/// Decodes the transport payload, runs the enhancement pipeline, and returns
/// the winning document re-encoded for transport alongside its justification.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    if request.file.trim().is_empty() {
        return Err(AppError::Validation("file cannot be empty".to_string()));
    }

    let raw = BASE64
        .decode(request.file.as_bytes())
        .map_err(|e| AppError::Validation(format!("file is not valid base64: {e}")))?;

    let result = state.orchestrator.run(&raw).await?;

    let encoded = pdf::encode(&result.document)?;
    Ok(Json(EnhanceResponse {
        enhanced_resume: BASE64.encode(encoded),
        explanation: result.justification,
    }))
}
