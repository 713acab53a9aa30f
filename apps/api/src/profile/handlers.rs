//! Axum route handlers for the Profile API.

use axum::Json;
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::profile::classifier::{classify, ClassificationResult};
use crate::profile::pdf::extract_document_text;
use crate::profile::validation::validate_pdf_upload;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

/// Text and verdict for one uploaded PDF.
#[derive(Debug)]
pub struct ProcessedUpload {
    pub text: String,
    pub classification: ClassificationResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/profiles/classify
///
/// Classifies already-extracted text. Rejections are a normal response here,
/// not an error: the caller decides how to surface `rejection_reason`.
pub async fn handle_classify(
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassificationResult>, AppError> {
    let result = classify(&request.text);
    tracing::info!(accepted = result.accepted, "Classified profile text");
    Ok(Json(result))
}

/// Validate → extract → classify for one upload.
pub async fn process_upload(
    state: &AppState,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<ProcessedUpload, AppError> {
    validate_pdf_upload(content_type, bytes.len(), state.config.max_pdf_size_mb)?;

    tracing::debug!(size_bytes = bytes.len(), "Extracting PDF text layer");
    let text = extract_document_text(state.text_layer.clone(), bytes)
        .await
        .map_err(|e| {
            tracing::warn!("PDF extraction failed: {e}");
            AppError::Extraction
        })?;

    let classification = classify(&text);
    tracing::info!(
        accepted = classification.accepted,
        name_found = classification.extracted_name.is_some(),
        rejection = ?classification.rejection(),
        "Classified uploaded profile"
    );

    Ok(ProcessedUpload {
        text,
        classification,
    })
}
