//! Per-speaker session state.
//!
//! All changes go through [`apply`], which mutates the state and returns the
//! effects the caller must run. Network work never happens in here.
//!
//! `lookup_generation` is the cancellation token for the debounced GitHub check:
//! every handle edit bumps it, and a lookup result is applied only if it carries
//! the current value.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::profile::validation::validate_github_username;
use crate::speaker::github::GithubProfile;
use crate::speaker::identity::compare_names;

/// Handles shorter than this are not looked up while the user is still typing.
pub const MIN_LOOKUP_HANDLE_CHARS: usize = 2;

pub const USER_NOT_FOUND: &str = "GitHub user not found";
pub const LOOKUP_FAILED: &str = "Failed to fetch GitHub profile";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerState {
    pub file_name: Option<String>,
    pub extracted_text: Option<String>,
    pub linkedin_name: Option<String>,
    pub file_error: Option<String>,
    pub github_username: String,
    pub gh_loading: bool,
    pub gh_error: Option<String>,
    pub gh_profile: Option<GithubProfile>,
    pub name_warning: Option<String>,
    pub lookup_generation: u64,
}

impl SpeakerState {
    pub fn handle(&self) -> &str {
        self.github_username.trim()
    }

    /// Returns the handle if one is set, otherwise `None`.
    pub fn optional_handle(&self) -> Option<&str> {
        Some(self.handle()).filter(|h| !h.is_empty())
    }

    pub fn has_profile(&self) -> bool {
        self.file_name.is_some() && self.extracted_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn clear_profile(&mut self) {
        self.file_name = None;
        self.extracted_text = None;
        self.linkedin_name = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(GithubProfile),
    NotFound,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeakerEvent {
    ProfileAccepted {
        file_name: String,
        text: String,
        name: Option<String>,
    },
    ProfileRejected {
        error: String,
    },
    /// The file could not be read. A previously accepted profile is kept.
    UploadFailed {
        error: String,
    },
    ProfileRemoved,
    GithubEdited {
        username: String,
    },
    LookupCompleted {
        generation: u64,
        username: String,
        outcome: LookupOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Look `username` up after the debounce delay, unless `generation` is stale by then.
    ScheduleLookup { generation: u64, username: String },
}

pub fn apply(state: &mut SpeakerState, event: SpeakerEvent) -> Vec<Effect> {
    match event {
        SpeakerEvent::ProfileAccepted {
            file_name,
            text,
            name,
        } => {
            state.file_name = Some(file_name);
            state.extracted_text = Some(text);
            state.linkedin_name = name.filter(|n| !n.is_empty());
            state.file_error = None;
            // Re-check so the name comparison sees the new profile.
            if state.optional_handle().is_some() {
                let username = state.github_username.clone();
                return edit_handle(state, username);
            }
            Vec::new()
        }
        SpeakerEvent::ProfileRejected { error } => {
            state.clear_profile();
            state.file_error = Some(error);
            Vec::new()
        }
        SpeakerEvent::UploadFailed { error } => {
            state.file_error = Some(error);
            Vec::new()
        }
        SpeakerEvent::ProfileRemoved => {
            state.clear_profile();
            state.file_error = None;
            state.name_warning = None;
            Vec::new()
        }
        SpeakerEvent::GithubEdited { username } => edit_handle(state, username),
        SpeakerEvent::LookupCompleted {
            generation,
            username,
            outcome,
        } => {
            complete_lookup(state, generation, &username, outcome);
            Vec::new()
        }
    }
}

fn edit_handle(state: &mut SpeakerState, username: String) -> Vec<Effect> {
    state.github_username = username;
    state.gh_profile = None;
    state.name_warning = None;
    state.gh_error = None;
    state.gh_loading = false;
    state.lookup_generation += 1;

    let handle = state.handle().to_string();
    if handle.is_empty() {
        return Vec::new();
    }
    if let Err(e) = validate_github_username(&handle) {
        state.gh_error = Some(e.0);
        return Vec::new();
    }
    if handle.chars().count() < MIN_LOOKUP_HANDLE_CHARS {
        return Vec::new();
    }

    state.gh_loading = true;
    vec![Effect::ScheduleLookup {
        generation: state.lookup_generation,
        username: handle,
    }]
}

fn complete_lookup(state: &mut SpeakerState, generation: u64, username: &str, outcome: LookupOutcome) {
    if generation != state.lookup_generation || username != state.handle() {
        tracing::debug!(generation, current = state.lookup_generation, "Dropping stale lookup result");
        return;
    }

    match outcome {
        LookupOutcome::Found(profile) => {
            let comparison = compare_names(state.linkedin_name.as_deref(), profile.name.as_deref());
            state.name_warning = comparison.warning;
            state.gh_profile = Some(profile);
            state.gh_error = None;
        }
        LookupOutcome::NotFound => state.gh_error = Some(USER_NOT_FOUND.to_string()),
        LookupOutcome::Failed => state.gh_error = Some(LOOKUP_FAILED.to_string()),
    }
    state.gh_loading = false;
}

// ────────────────────────────────────────────────────────────────────────────
// Store and public view
// ────────────────────────────────────────────────────────────────────────────

/// In-memory speaker sessions keyed by id. Nothing outlives the process.
#[derive(Clone, Default)]
pub struct SpeakerStore {
    inner: Arc<RwLock<HashMap<Uuid, SpeakerState>>>,
}

impl SpeakerStore {
    pub async fn create(&self) -> (Uuid, SpeakerState) {
        let id = Uuid::new_v4();
        let state = SpeakerState::default();
        self.inner.write().await.insert(id, state.clone());
        (id, state)
    }

    pub async fn get(&self, id: Uuid) -> Option<SpeakerState> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Applies `event` and returns the effects plus a snapshot of the new state.
    pub async fn dispatch(&self, id: Uuid, event: SpeakerEvent) -> Option<(Vec<Effect>, SpeakerState)> {
        let mut sessions = self.inner.write().await;
        let state = sessions.get_mut(&id)?;
        let effects = apply(state, event);
        Some((effects, state.clone()))
    }

    /// Drops the session and its extracted text. Returns `false` for unknown ids.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn current_generation(&self, id: Uuid) -> Option<u64> {
        self.inner.read().await.get(&id).map(|s| s.lookup_generation)
    }
}

/// What the API returns for a speaker. The extracted text itself stays server-side.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerView {
    pub id: Uuid,
    pub file_name: Option<String>,
    pub has_profile: bool,
    pub profile_text_chars: usize,
    pub linkedin_name: Option<String>,
    pub file_error: Option<String>,
    pub github_username: String,
    pub gh_loading: bool,
    pub gh_error: Option<String>,
    pub gh_profile: Option<GithubProfile>,
    pub name_warning: Option<String>,
}

impl SpeakerView {
    pub fn new(id: Uuid, state: &SpeakerState) -> Self {
        Self {
            id,
            file_name: state.file_name.clone(),
            has_profile: state.has_profile(),
            profile_text_chars: state.extracted_text.as_deref().map_or(0, |t| t.chars().count()),
            linkedin_name: state.linkedin_name.clone(),
            file_error: state.file_error.clone(),
            github_username: state.github_username.clone(),
            gh_loading: state.gh_loading,
            gh_error: state.gh_error.clone(),
            gh_profile: state.gh_profile.clone(),
            name_warning: state.name_warning.clone(),
        }
    }
}
