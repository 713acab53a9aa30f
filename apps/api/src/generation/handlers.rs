//! Axum route handlers for the Topics API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::SpeakerInput;
use crate::generation::topics::TopicSet;
use crate::speaker::session::SpeakerState;
use crate::state::AppState;

pub const MISSING_PROFILE_MESSAGE: &str = "Upload a LinkedIn profile PDF before generating topics.";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SoloTopicsRequest {
    pub speaker_id: Uuid,
    /// Overrides the server key for this request.
    pub api_key: Option<String>,
    pub event_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollabTopicsRequest {
    pub speaker_ids: [Uuid; 2],
    pub api_key: Option<String>,
    pub event_description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/topics/solo
pub async fn handle_generate_solo(
    State(state): State<AppState>,
    Json(request): Json<SoloTopicsRequest>,
) -> Result<Json<TopicSet>, AppError> {
    let speaker = speaker_input(&state, request.speaker_id).await?;
    let api_key = resolve_api_key(&state, request.api_key.as_deref());

    let set = state
        .generator
        .generate_solo(api_key, &speaker, request.event_description.as_deref())
        .await?;

    Ok(Json(set))
}

/// POST /api/v1/topics/collab
pub async fn handle_generate_collab(
    State(state): State<AppState>,
    Json(request): Json<CollabTopicsRequest>,
) -> Result<Json<TopicSet>, AppError> {
    let [id1, id2] = request.speaker_ids;
    if id1 == id2 {
        return Err(AppError::Validation(
            "Collaborative generation needs two different speakers.".to_string(),
        ));
    }
    let first = speaker_input(&state, id1)
        .await
        .map_err(|e| e.prefixed("Speaker 1: "))?;
    let second = speaker_input(&state, id2)
        .await
        .map_err(|e| e.prefixed("Speaker 2: "))?;
    let api_key = resolve_api_key(&state, request.api_key.as_deref());

    let set = state
        .generator
        .generate_collab(api_key, [&first, &second], request.event_description.as_deref())
        .await?;

    Ok(Json(set))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn speaker_input(state: &AppState, id: Uuid) -> Result<SpeakerInput, AppError> {
    let speaker = state
        .speakers
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Speaker {id} not found")))?;
    to_input(speaker)
}

fn to_input(speaker: SpeakerState) -> Result<SpeakerInput, AppError> {
    if !speaker.has_profile() {
        return Err(AppError::Validation(MISSING_PROFILE_MESSAGE.to_string()));
    }
    let github_username = speaker.optional_handle().map(str::to_string);
    Ok(SpeakerInput {
        profile_text: speaker.extracted_text.unwrap_or_default(),
        github_username,
    })
}

fn resolve_api_key<'a>(state: &'a AppState, requested: Option<&'a str>) -> Option<&'a str> {
    requested
        .filter(|k| !k.trim().is_empty())
        .or(state.config.gemini_api_key.as_deref())
}
