use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;

use super::revision::{parse_revision_uri, RevisionRef};
use crate::auth::Token;
use crate::error::{CINotifyError, Result};
use crate::model::CommitInfo;
use crate::providers::CommitInfoProvider;

/// GitHub API client for resolving commit metadata.
#[derive(Clone)]
pub struct GitHubClient {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL for GitHub API
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `token` - Optional GitHub personal access token
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`CINotifyError::Config`] if the token is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<Token>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("cinotify/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| CINotifyError::Config("GitHub token is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CINotifyError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a single commit.
    ///
    /// # Arguments
    ///
    /// * `revision` - Owner, repository and sha of the commit
    ///
    /// # Returns
    ///
    /// The commit's sha, author and message.
    pub async fn fetch_commit(&self, revision: &RevisionRef) -> Result<CommitInfo> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.base_url, revision.owner, revision.repo, revision.sha
        );
        debug!("Fetching commit {url}");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CINotifyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let commit: CommitResponse = response.json().await?;
        let author = commit.commit.author.unwrap_or_default();

        Ok(CommitInfo {
            sha: commit.sha,
            author_name: author.name,
            author_email: author.email,
            message: commit.commit.message,
            html_url: commit.html_url,
        })
    }
}

#[async_trait]
impl CommitInfoProvider for GitHubClient {
    async fn resolve(&self, revision_url: &str) -> Result<CommitInfo> {
        let revision = parse_revision_uri(revision_url)?;
        self.fetch_commit(&revision).await
    }
}

/// Response from GitHub API for a single commit.
#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: Option<String>,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    author: Option<GitAuthor>,
}

#[derive(Deserialize, Default)]
struct GitAuthor {
    name: Option<String>,
    email: Option<String>,
}
