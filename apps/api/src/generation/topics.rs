//! Topic model and model-output parsing.
//!
//! The model is asked for `{"topics":[...]}` but may wrap it in prose or code
//! fences. Parsing falls back to the first balanced `{...}` block, then every
//! topic is normalised and incomplete ones are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm_client::{strip_json_fences, GenerationFailure};

pub const MAX_TOPICS: usize = 6;
pub const DEFAULT_DURATION: &str = "45 min";
pub const DEFAULT_AUDIENCE: &str = "Intermediate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicFormat {
    Talk,
    Workshop,
}

impl TopicFormat {
    /// Anything but the literal `"workshop"` is a talk.
    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("workshop") => TopicFormat::Workshop,
            _ => TopicFormat::Talk,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TopicFormat::Talk => "Talk",
            TopicFormat::Workshop => "Workshop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub description: String,
    pub format: TopicFormat,
    pub duration: String,
    pub audience: String,
}

/// A topic as returned to the client, with a ready-to-paste research prompt.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSuggestion {
    #[serde(flatten)]
    pub topic: Topic,
    pub research_prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicSet {
    pub topics: Vec<TopicSuggestion>,
    pub talks: usize,
    pub workshops: usize,
    /// Plain-text rendering of all topics, for copying.
    pub summary: String,
    pub generated_at: DateTime<Utc>,
}

impl TopicSet {
    pub fn new(topics: Vec<Topic>) -> Self {
        let workshops = topics
            .iter()
            .filter(|t| t.format == TopicFormat::Workshop)
            .count();
        let summary = summarize(&topics);
        Self {
            talks: topics.len() - workshops,
            workshops,
            summary,
            generated_at: Utc::now(),
            topics: topics
                .into_iter()
                .map(|topic| TopicSuggestion {
                    research_prompt: research_prompt(&topic),
                    topic,
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses raw model text into at most [`MAX_TOPICS`] normalised topics.
pub fn parse_topics(raw: &str) -> Result<Vec<Topic>, GenerationFailure> {
    let text = strip_json_fences(raw);
    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            let block = first_json_object(text).ok_or(GenerationFailure::NonJson)?;
            serde_json::from_str(block).map_err(|_| GenerationFailure::NonJson)?
        }
    };

    let topics = normalize_topics(parsed.get("topics"));
    if topics.is_empty() {
        return Err(GenerationFailure::NoTopics);
    }
    Ok(topics)
}

pub fn normalize_topics(topics: Option<&Value>) -> Vec<Topic> {
    let Some(items) = topics.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|t| Topic {
            title: field_text(t.get("title")),
            description: field_text(t.get("description")),
            format: TopicFormat::from_value(t.get("format")),
            duration: non_empty_or(field_text(t.get("duration")), DEFAULT_DURATION),
            audience: non_empty_or(field_text(t.get("audience")), DEFAULT_AUDIENCE),
        })
        .filter(|t| !t.title.is_empty() && !t.description.is_empty())
        .take(MAX_TOPICS)
        .collect()
}

/// Scalars become trimmed text; null, false, zero, arrays and objects become empty.
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Returns the first `{...}` block whose braces balance, ignoring braces inside strings.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Prompt a speaker can paste into any assistant to start preparing the topic.
pub fn research_prompt(topic: &Topic) -> String {
    let engaging = match topic.format {
        TopicFormat::Workshop => "hands-on exercises",
        TopicFormat::Talk => "presentation",
    };
    format!(
        "I'm preparing a {format} titled \"{title}\" for a technical conference. \
The target audience is {audience} level developers, and the duration is {duration}.\n\n\
Here's the abstract: {description}\n\n\
Please help me prepare by:\n\
1. Creating a detailed outline with key talking points\n\
2. Suggesting 3-5 live demos or code examples I should include\n\
3. Identifying potential questions the audience might ask\n\
4. Recommending recent articles, papers, or resources I should reference\n\
5. Suggesting ways to make the {engaging} more engaging\n\
6. Providing tips for the introduction and conclusion to make them memorable",
        format = match topic.format {
            TopicFormat::Talk => "talk",
            TopicFormat::Workshop => "workshop",
        },
        title = topic.title,
        audience = topic.audience,
        duration = topic.duration,
        description = topic.description,
    )
}

pub fn summarize(topics: &[Topic]) -> String {
    topics
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {}\n\nFormat: {}\nDuration: {}\nAudience: {}\n\n{}",
                i + 1,
                t.title,
                t.format.label(),
                t.duration,
                t.audience,
                t.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}
