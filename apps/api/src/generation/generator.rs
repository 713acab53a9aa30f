//! Topic Generation: orchestrates the generation pipeline.
//!
//! Flow: validate inputs → sanitize profile/event text → fetch GitHub activity →
//!       build prompt context → LLM call → parse + normalise topics.
//!
//! Every failure is terminal for the attempt. Session state is left untouched so
//! the user can fix the input and resubmit.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{collab_system_prompt, solo_system_prompt};
use crate::generation::sanitizer::sanitize_for_prompt;
use crate::generation::topics::{parse_topics, TopicSet};
use crate::llm_client::CompletionProvider;
use crate::profile::validation::{
    validate_event_description, validate_github_username, validate_text_length,
};
use crate::speaker::github::{GithubActivity, ProfileLookup};

pub const MISSING_API_KEY_MESSAGE: &str = "Gemini API key is required. Add it above to continue.";
/// Repositories listed per speaker in the prompt.
const SOLO_PROMPT_REPOS: usize = 10;
const COLLAB_PROMPT_REPOS: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One speaker's inputs as read from the session.
#[derive(Debug, Clone)]
pub struct SpeakerInput {
    pub profile_text: String,
    pub github_username: Option<String>,
}

impl SpeakerInput {
    fn handle(&self) -> Option<&str> {
        self.github_username
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

#[derive(Clone)]
pub struct TopicGenerator {
    llm: Arc<dyn CompletionProvider>,
    github: Arc<dyn ProfileLookup>,
}

impl TopicGenerator {
    pub fn new(llm: Arc<dyn CompletionProvider>, github: Arc<dyn ProfileLookup>) -> Self {
        Self { llm, github }
    }

    pub async fn generate_solo(
        &self,
        api_key: Option<&str>,
        speaker: &SpeakerInput,
        event_description: Option<&str>,
    ) -> Result<TopicSet, AppError> {
        let api_key = require_api_key(api_key)?;
        validate_text_length(&speaker.profile_text)?;
        let event = prepare_event(event_description)?;
        if let Some(handle) = speaker.handle() {
            validate_github_username(handle)?;
        }

        let profile_text = sanitize_for_prompt(&speaker.profile_text);
        let activity = self.activity_for(speaker.handle()).await;
        let context = build_solo_context(&profile_text, activity.as_ref(), event.as_deref());
        let system = solo_system_prompt(event.is_some());

        self.run(api_key, &system, &context, "solo").await
    }

    pub async fn generate_collab(
        &self,
        api_key: Option<&str>,
        speakers: [&SpeakerInput; 2],
        event_description: Option<&str>,
    ) -> Result<TopicSet, AppError> {
        let api_key = require_api_key(api_key)?;
        let [first, second] = speakers;
        validate_text_length(&first.profile_text).map_err(|e| AppError::from(e).prefixed("Speaker 1: "))?;
        validate_text_length(&second.profile_text).map_err(|e| AppError::from(e).prefixed("Speaker 2: "))?;
        let event = prepare_event(event_description)?;
        for (n, speaker) in [(1, first), (2, second)] {
            if let Some(handle) = speaker.handle() {
                validate_github_username(handle)
                    .map_err(|e| AppError::from(e).prefixed(&format!("Speaker {n}: ")))?;
            }
        }

        let (activity1, activity2) = tokio::join!(
            self.activity_for(first.handle()),
            self.activity_for(second.handle())
        );

        let mut context = build_speaker_context(
            &sanitize_for_prompt(&first.profile_text),
            activity1.as_ref(),
            1,
        );
        context.push_str(&build_speaker_context(
            &sanitize_for_prompt(&second.profile_text),
            activity2.as_ref(),
            2,
        ));
        if let Some(event) = &event {
            let _ = write!(context, "\n=== EVENT CONTEXT ===\n{event}\n");
        }
        let system = collab_system_prompt(event.is_some());

        self.run(api_key, &system, &context, "collab").await
    }

    async fn activity_for(&self, handle: Option<&str>) -> Option<GithubActivity> {
        match handle {
            Some(h) => Some(self.github.fetch_activity(h).await),
            None => None,
        }
    }

    async fn run(
        &self,
        api_key: &str,
        system: &str,
        context: &str,
        mode: &str,
    ) -> Result<TopicSet, AppError> {
        let raw = self.llm.complete(api_key, system, context).await?;
        let topics = parse_topics(&raw).map_err(|e| {
            tracing::warn!(mode, "Unusable model output: {e}");
            e
        })?;

        let set = TopicSet::new(topics);
        info!(
            mode,
            talks = set.talks,
            workshops = set.workshops,
            "Generated topics"
        );
        Ok(set)
    }
}

fn require_api_key(api_key: Option<&str>) -> Result<&str, AppError> {
    api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::Validation(MISSING_API_KEY_MESSAGE.to_string()))
}

/// Blank descriptions count as absent. Present ones are length-checked, then sanitized.
fn prepare_event(event_description: Option<&str>) -> Result<Option<String>, AppError> {
    match event_description.filter(|e| !e.trim().is_empty()) {
        Some(event) => {
            validate_event_description(event)?;
            Ok(Some(sanitize_for_prompt(event)))
        }
        None => Ok(None),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt context
// ────────────────────────────────────────────────────────────────────────────

pub fn build_solo_context(
    profile_text: &str,
    activity: Option<&GithubActivity>,
    event: Option<&str>,
) -> String {
    let mut context = format!("LinkedIn Profile Summary:\n{profile_text}\n");
    if let Some(activity) = activity {
        push_github_block(&mut context, activity, SOLO_PROMPT_REPOS, true);
    }
    if let Some(event) = event {
        let _ = write!(context, "\n=== EVENT CONTEXT ===\n{event}\n");
    }
    context
}

pub fn build_speaker_context(
    profile_text: &str,
    activity: Option<&GithubActivity>,
    speaker_number: usize,
) -> String {
    let mut context = format!("\n=== SPEAKER {speaker_number} ===\nLinkedIn Profile:\n{profile_text}\n");
    if let Some(activity) = activity {
        push_github_block(&mut context, activity, COLLAB_PROMPT_REPOS, false);
    }
    context
}

fn push_github_block(
    context: &mut String,
    activity: &GithubActivity,
    max_repos: usize,
    with_topics: bool,
) {
    if let Some(user) = &activity.user {
        let or_na = |v: &Option<String>| v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "N/A".to_string());
        let count_or_na = |v: Option<u32>| v.map_or_else(|| "N/A".to_string(), |n| n.to_string());
        context.push_str("\nGitHub Profile:\n");
        let _ = writeln!(context, "- Name: {}", or_na(&user.name));
        let _ = writeln!(context, "- Bio: {}", or_na(&user.bio));
        let _ = writeln!(context, "- Company: {}", or_na(&user.company));
        let _ = writeln!(context, "- Public Repos: {}", count_or_na(user.public_repos));
        let _ = writeln!(context, "- Followers: {}", count_or_na(user.followers));
    }

    if activity.repos.is_empty() {
        return;
    }
    context.push_str("\nTop GitHub Repositories:\n");
    for repo in activity.repos.iter().take(max_repos) {
        let _ = write!(context, "- {}", repo.name);
        if let Some(lang) = repo.language.as_deref().filter(|l| !l.is_empty()) {
            let _ = write!(context, " ({lang})");
        }
        if repo.stargazers_count > 0 {
            let _ = write!(context, " ⭐{}", repo.stargazers_count);
        }
        if let Some(desc) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(context, ": {desc}");
        }
        if with_topics && !repo.topics.is_empty() {
            let _ = write!(context, " [{}]", repo.topics.join(", "));
        }
        context.push('\n');
    }
}
