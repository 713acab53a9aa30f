use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_GEMINI_ENDPOINT;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Fallback key when a request does not carry its own.
    pub gemini_api_key: Option<String>,
    pub gemini_endpoint: String,
    pub github_api_url: String,
    pub lookup_debounce: Duration,
    pub max_pdf_size_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            gemini_api_key: None,
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            lookup_debounce: Duration::from_millis(700),
            max_pdf_size_mb: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_endpoint: optional_env("GEMINI_ENDPOINT").unwrap_or(defaults.gemini_endpoint),
            github_api_url: optional_env("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            lookup_debounce: Duration::from_millis(parse_env(
                "LOOKUP_DEBOUNCE_MS",
                defaults.lookup_debounce.as_millis() as u64,
            )?),
            max_pdf_size_mb: parse_env("MAX_PDF_SIZE_MB", defaults.max_pdf_size_mb)?,
        })
    }

    /// Request body ceiling for uploads: the PDF limit plus multipart overhead.
    pub fn upload_body_limit(&self) -> usize {
        (self.max_pdf_size_mb as usize + 1) * 1024 * 1024
    }
}

/// Unset or blank variables count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
