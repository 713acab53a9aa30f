//! GitHub profile lookup provider.
//!
//! [`ProfileLookup`] has two uses. [`ProfileLookup::fetch_profile`] backs the
//! debounced handle check and surfaces failures to the caller.
//! [`ProfileLookup::fetch_activity`] gathers prompt context and never fails: a
//! missing user or a network error yields an empty activity.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::validation::MAX_GITHUB_USERNAME_CHARS;

const USER_AGENT: &str = "TalkForge-App";
/// Repositories requested for prompt context.
pub const MAX_ACTIVITY_REPOS: usize = 20;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid lookup URL: {0}")]
    InvalidUrl(String),
}

/// Public profile summary shown next to the handle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    pub company: Option<String>,
}

/// The subset of a user record used in prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubUserSummary {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub public_repos: Option<u32>,
    pub followers: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubActivity {
    pub user: Option<GithubUserSummary>,
    pub repos: Vec<GithubRepo>,
}

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// `Ok(None)` when the user does not exist (any non-2xx answer).
    async fn fetch_profile(&self, username: &str) -> Result<Option<GithubProfile>, LookupError>;

    /// User summary plus most-starred repositories. Failures degrade to empty.
    async fn fetch_activity(&self, username: &str) -> GithubActivity;
}

/// Lookup provider backed by the GitHub REST API.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build GitHub HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn user_url(&self, username: &str) -> Result<Url, LookupError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| LookupError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("users")
            .push(username);
        Ok(url)
    }

    fn repos_url(&self, username: &str) -> Result<Url, LookupError> {
        let mut url = self.user_url(username)?;
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.base_url.clone()))?
            .push("repos");
        url.query_pairs_mut()
            .append_pair("sort", "stars")
            .append_pair("per_page", &MAX_ACTIVITY_REPOS.to_string());
        Ok(url)
    }

    async fn try_fetch_activity(&self, username: &str) -> Result<GithubActivity, LookupError> {
        let user_req = self.client.get(self.user_url(username)?).send();
        let repos_req = self.client.get(self.repos_url(username)?).send();
        let (user_res, repos_res) = tokio::join!(user_req, repos_req);

        let user_res = user_res?;
        if !user_res.status().is_success() {
            return Ok(GithubActivity::default());
        }
        let user: GithubUserSummary = user_res.json().await?;

        let repos = match repos_res {
            Ok(res) if res.status().is_success() => res.json::<Vec<GithubRepo>>().await?,
            _ => Vec::new(),
        };

        Ok(GithubActivity {
            user: Some(user),
            repos: rank_repos(repos),
        })
    }
}

#[async_trait]
impl ProfileLookup for GithubClient {
    async fn fetch_profile(&self, username: &str) -> Result<Option<GithubProfile>, LookupError> {
        let response = self.client.get(self.user_url(username)?).send().await?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "GitHub user lookup returned non-success");
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    async fn fetch_activity(&self, username: &str) -> GithubActivity {
        let handle = truncate_handle(username);
        match self.try_fetch_activity(handle).await {
            Ok(activity) => {
                tracing::debug!(repos = activity.repos.len(), "Fetched GitHub activity");
                activity
            }
            Err(e) => {
                tracing::warn!("GitHub activity fetch failed: {e}");
                GithubActivity::default()
            }
        }
    }
}

/// Most-starred first, capped at [`MAX_ACTIVITY_REPOS`].
pub fn rank_repos(mut repos: Vec<GithubRepo>) -> Vec<GithubRepo> {
    repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    repos.truncate(MAX_ACTIVITY_REPOS);
    repos
}

fn truncate_handle(username: &str) -> &str {
    let trimmed = username.trim();
    match trimmed.char_indices().nth(MAX_GITHUB_USERNAME_CHARS) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: u32) -> GithubRepo {
        GithubRepo {
            name: name.to_string(),
            description: None,
            language: None,
            stargazers_count: stars,
            topics: vec![],
        }
    }

    #[test]
    fn test_user_url_escapes_handle() {
        let client = GithubClient::new("https://api.github.com").unwrap();
        assert_eq!(
            client.user_url("octocat").unwrap().as_str(),
            "https://api.github.com/users/octocat"
        );
        assert_eq!(
            client.user_url("a b").unwrap().as_str(),
            "https://api.github.com/users/a%20b"
        );
    }

    #[test]
    fn test_repos_url_requests_twenty_by_stars() {
        let client = GithubClient::new("http://localhost:9000/").unwrap();
        assert_eq!(
            client.repos_url("octocat").unwrap().as_str(),
            "http://localhost:9000/users/octocat/repos?sort=stars&per_page=20"
        );
    }

    #[test]
    fn test_rank_repos_sorts_by_stars_and_caps() {
        let repos: Vec<_> = (0..25).map(|i| repo(&format!("r{i}"), i)).collect();
        let ranked = rank_repos(repos);
        assert_eq!(ranked.len(), MAX_ACTIVITY_REPOS);
        assert_eq!(ranked[0].name, "r24");
        assert!(ranked.windows(2).all(|w| w[0].stargazers_count >= w[1].stargazers_count));
    }

    #[test]
    fn test_truncate_handle() {
        assert_eq!(truncate_handle("  octocat "), "octocat");
        assert_eq!(truncate_handle(&"a".repeat(50)).len(), 39);
    }

    #[test]
    fn test_profile_tolerates_missing_optional_fields() {
        let p: GithubProfile = serde_json::from_str(r#"{"login":"octocat","name":null}"#).unwrap();
        assert_eq!(p.login, "octocat");
        assert_eq!(p.public_repos, 0);
        assert!(p.company.is_none());
    }
}
