use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::GenerationFailure;
use crate::profile::validation::ValidationError;

/// Shown for every PDF the text-layer provider cannot read.
pub const EXTRACTION_FAILED_MESSAGE: &str = "Failed to read PDF. Please try a different file.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not a profile: {0}")]
    Rejected(String),

    #[error("PDF extraction failed")]
    Extraction,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationFailure),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

impl AppError {
    /// Prefixes the user-facing message, e.g. with `"Speaker 2: "`.
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            AppError::Validation(msg) => AppError::Validation(format!("{prefix}{msg}")),
            AppError::Rejected(msg) => AppError::Rejected(format!("{prefix}{msg}")),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Rejected(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOT_A_PROFILE",
                msg.clone(),
            ),
            AppError::Extraction => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                EXTRACTION_FAILED_MESSAGE.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Lookup(msg) => {
                tracing::warn!("Lookup error: {msg}");
                (StatusCode::BAD_GATEWAY, "LOOKUP_FAILED", msg.clone())
            }
            AppError::Generation(failure) => {
                tracing::error!("Generation error: {failure:?}");
                (
                    failure.status_code(),
                    "GENERATION_FAILED",
                    failure.user_message(),
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
