//! Axum route handlers for the Speakers API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, EXTRACTION_FAILED_MESSAGE};
use crate::profile::handlers::process_upload;
use crate::profile::validation::validate_github_username;
use crate::speaker::github::GithubProfile;
use crate::speaker::session::{
    SpeakerEvent, SpeakerState, SpeakerView, LOOKUP_FAILED, USER_NOT_FOUND,
};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "profile.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateGithubRequest {
    pub username: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/speakers
pub async fn handle_create_speaker(
    State(state): State<AppState>,
) -> (StatusCode, Json<SpeakerView>) {
    let (id, speaker) = state.speakers.create().await;
    tracing::info!(%id, "Created speaker session");
    (StatusCode::CREATED, Json(SpeakerView::new(id, &speaker)))
}

/// GET /api/v1/speakers/:id
pub async fn handle_get_speaker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SpeakerView>, AppError> {
    let speaker = state.speakers.get(id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(SpeakerView::new(id, &speaker)))
}

/// DELETE /api/v1/speakers/:id
///
/// Ends the session. Pending lookups for it finish against nothing.
pub async fn handle_delete_speaker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.speakers.remove(id).await {
        return Err(not_found(id));
    }
    tracing::info!(%id, "Deleted speaker session");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/speakers/:id/profile
///
/// Multipart upload with a single `file` field. Validation, extraction and
/// classification failures are recorded on the session as `file_error` and also
/// returned as the error response.
pub async fn handle_upload_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SpeakerView>, AppError> {
    state.speakers.get(id).await.ok_or_else(|| not_found(id))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }
    let (file_name, content_type, bytes) = upload.ok_or_else(|| {
        AppError::Validation(format!("Missing multipart field '{UPLOAD_FIELD}'"))
    })?;

    let processed = match process_upload(&state, content_type.as_deref(), bytes).await {
        Ok(processed) => processed,
        Err(err) => {
            let event = match &err {
                AppError::Validation(msg) => SpeakerEvent::ProfileRejected { error: msg.clone() },
                AppError::Extraction => SpeakerEvent::UploadFailed {
                    error: EXTRACTION_FAILED_MESSAGE.to_string(),
                },
                _ => return Err(err),
            };
            state.speakers.dispatch(id, event).await;
            return Err(err);
        }
    };

    let classification = processed.classification;
    if !classification.accepted {
        let reason = classification.rejection_reason.unwrap_or_default();
        state
            .speakers
            .dispatch(id, SpeakerEvent::ProfileRejected { error: reason.clone() })
            .await;
        return Err(AppError::Rejected(reason));
    }

    let event = SpeakerEvent::ProfileAccepted {
        file_name,
        text: processed.text,
        name: classification.extracted_name,
    };
    let speaker = dispatch(&state, id, event).await?;
    Ok(Json(SpeakerView::new(id, &speaker)))
}

/// DELETE /api/v1/speakers/:id/profile
pub async fn handle_remove_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SpeakerView>, AppError> {
    let speaker = dispatch(&state, id, SpeakerEvent::ProfileRemoved).await?;
    Ok(Json(SpeakerView::new(id, &speaker)))
}

/// PUT /api/v1/speakers/:id/github
///
/// Stores the handle and schedules a debounced lookup. The response reflects the
/// immediate state (`gh_loading` while a lookup is pending); poll the speaker to
/// see the result.
pub async fn handle_update_github(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGithubRequest>,
) -> Result<Json<SpeakerView>, AppError> {
    let speaker = dispatch(
        &state,
        id,
        SpeakerEvent::GithubEdited {
            username: request.username,
        },
    )
    .await?;
    Ok(Json(SpeakerView::new(id, &speaker)))
}

/// GET /api/v1/github/:username
///
/// Immediate, undebounced profile lookup.
pub async fn handle_lookup_github(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<GithubProfile>, AppError> {
    let handle = username.trim();
    if handle.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    validate_github_username(handle)?;

    match state.github.fetch_profile(handle).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
        Err(e) => {
            tracing::warn!("GitHub profile lookup failed: {e}");
            Err(AppError::Lookup(LOOKUP_FAILED.to_string()))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Applies `event`, starts any resulting lookups and returns the new state.
async fn dispatch(state: &AppState, id: Uuid, event: SpeakerEvent) -> Result<SpeakerState, AppError> {
    let (effects, speaker) = state
        .speakers
        .dispatch(id, event)
        .await
        .ok_or_else(|| not_found(id))?;
    if !effects.is_empty() {
        tracing::info!(%id, "Scheduling GitHub lookup");
    }
    state.lookups.run(id, effects);
    Ok(speaker)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Speaker {id} not found"))
}
