use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracker_core::QuotaUsage;

use super::QuotaSource;

pub const OAUTH_USAGE_URL: &str = "https://api.anthropic.com/api/oauth/usage";
const OAUTH_BETA_HEADER: &str = "anthropic-beta";
const OAUTH_BETA_VALUE: &str = "oauth-2025-04-20";

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(rename = "claudeAiOauth")]
    claude_ai_oauth: Option<OAuthCredentials>,
}

#[derive(Debug, Deserialize)]
struct OAuthCredentials {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// Access token from the agent's credentials file, if present and readable.
pub fn read_access_token(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let credentials: CredentialsFile = serde_json::from_str(&contents).ok()?;
    credentials
        .claude_ai_oauth?
        .access_token
        .filter(|token| !token.is_empty())
}

/// Fetches quota utilization from the OAuth usage endpoint using the locally
/// stored access token.
#[derive(Debug, Clone)]
pub struct OAuthQuotaSource {
    credentials_path: PathBuf,
    endpoint: String,
    timeout: Duration,
}

impl OAuthQuotaSource {
    pub fn new(credentials_path: PathBuf, timeout: Duration) -> Self {
        Self {
            credentials_path,
            endpoint: OAUTH_USAGE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request(&self, token: &str) -> Result<QuotaUsage, String> {
        // Built per call: the blocking client must not live on an async thread.
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| format!("build quota client: {err}"))?;
        let response = client
            .get(&self.endpoint)
            .bearer_auth(token)
            .header(OAUTH_BETA_HEADER, OAUTH_BETA_VALUE)
            .send()
            .map_err(|err| format!("quota request failed: {err}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("quota request returned {status}"));
        }
        response
            .json::<QuotaUsage>()
            .map_err(|err| format!("decode quota response: {err}"))
    }
}

impl QuotaSource for OAuthQuotaSource {
    fn fetch(&self) -> Option<QuotaUsage> {
        let Some(token) = read_access_token(&self.credentials_path) else {
            tracing::debug!(
                path = %self.credentials_path.display(),
                "no oauth token available, quota unavailable"
            );
            return None;
        };
        match self.request(&token) {
            Ok(usage) => Some(usage),
            Err(message) => {
                tracing::warn!(endpoint = %self.endpoint, error = %message, "quota fetch failed");
                None
            }
        }
    }
}
