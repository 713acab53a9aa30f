/// LLM Client: the single point of entry for generative completion calls in TalkForge.
///
/// Talks to the Gemini `generateContent` endpoint. The API key is supplied per call:
/// speakers bring their own key, the server key is only a fallback.
///
/// No retries: a failed call is reported to the user, who can resubmit.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const TEMPERATURE: f32 = 0.8;
const RESPONSE_MIME_TYPE: &str = "application/json";
/// Raw provider error bodies are cut to this many characters before reaching the user.
const ERROR_BODY_PREVIEW_CHARS: usize = 160;
const SAFETY_FINISH_REASON: &str = "SAFETY";

#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("provider rejected the API key")]
    InvalidCredential,

    #[error("provider is rate limiting")]
    Busy,

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response blocked by safety filters")]
    SafetyBlocked,

    #[error("response contained no text")]
    EmptyResponse,

    #[error("response was not JSON")]
    NonJson,

    #[error("response contained no usable topics")]
    NoTopics,
}

impl GenerationFailure {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GenerationFailure::InvalidCredential,
            429 => GenerationFailure::Busy,
            _ => GenerationFailure::Api { status, body },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerationFailure::InvalidCredential => StatusCode::UNAUTHORIZED,
            GenerationFailure::Busy => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            GenerationFailure::InvalidCredential => {
                "Invalid Gemini API key. Please verify and try again.".to_string()
            }
            GenerationFailure::Busy => {
                "Service temporarily busy. Please try again in a moment.".to_string()
            }
            GenerationFailure::Api { status, body } => {
                let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
                format!("Failed to generate topics. ({status}) {preview}")
            }
            GenerationFailure::Http(_) => "Failed to generate topics".to_string(),
            GenerationFailure::SafetyBlocked => "The request was blocked by Gemini safety filters. \
                Try adjusting the event context or profile content."
                .to_string(),
            GenerationFailure::EmptyResponse => "Failed to parse model response.".to_string(),
            GenerationFailure::NonJson => {
                "Model returned non-JSON output. Please try again.".to_string()
            }
            GenerationFailure::NoTopics => {
                "No valid topics were generated. Please try again.".to_string()
            }
        }
    }
}

/// A generative model that answers one system instruction plus one user message.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model's raw text output.
    async fn complete(
        &self,
        api_key: &str,
        system: &str,
        user: &str,
    ) -> Result<String, GenerationFailure>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: RequestContent<'a>,
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Joins every text part of the first candidate. Empty text is an error;
    /// a `SAFETY` finish reason is reported separately.
    pub fn into_text(self) -> Result<String, GenerationFailure> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(GenerationFailure::EmptyResponse);
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text.unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return Ok(text);
        }
        if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) {
            return Err(GenerationFailure::SafetyBlocked);
        }
        Err(GenerationFailure::EmptyResponse)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .context("Failed to build Gemini HTTP client")?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(
        &self,
        api_key: &str,
        system: &str,
        user: &str,
    ) -> Result<String, GenerationFailure> {
        let request_body = GenerateContentRequest {
            system_instruction: RequestContent {
                role: None,
                parts: vec![RequestPart { text: system }],
            },
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: user }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE,
                temperature: TEMPERATURE,
            },
        };

        debug!(
            system_chars = system.len(),
            user_chars = user.len(),
            "Calling Gemini generateContent"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationFailure::from_status(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text()?;
        debug!(response_chars = text.len(), "Gemini call succeeded");
        Ok(text)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let unfenced = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match unfenced {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_uses_gemini_field_names() {
        let body = GenerateContentRequest {
            system_instruction: RequestContent {
                role: None,
                parts: vec![RequestPart { text: "sys" }],
            },
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE,
                temperature: TEMPERATURE,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_parts_are_joined_with_newline() {
        let r = response(r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#);
        assert_eq!(r.into_text().unwrap(), "a\nb");
    }

    #[test]
    fn test_empty_text_with_safety_reason_is_blocked() {
        let r = response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(r.into_text(), Err(GenerationFailure::SafetyBlocked)));
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let r = response("{}");
        assert!(matches!(r.into_text(), Err(GenerationFailure::EmptyResponse)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GenerationFailure::from_status(403, String::new()),
            GenerationFailure::InvalidCredential
        ));
        assert!(matches!(
            GenerationFailure::from_status(429, String::new()),
            GenerationFailure::Busy
        ));
        let api = GenerationFailure::from_status(500, "x".repeat(300));
        assert_eq!(api.status_code(), StatusCode::BAD_GATEWAY);
        let msg = api.user_message();
        assert!(msg.starts_with("Failed to generate topics. (500) "));
        assert_eq!(msg.len(), "Failed to generate topics. (500) ".len() + 160);
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }
}
