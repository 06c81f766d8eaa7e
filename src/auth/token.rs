use anyhow::{bail, Context, Result};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

/// Zoom OAuth token endpoint
pub const DEFAULT_OAUTH_URL: &str = "https://zoom.us/oauth/token";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of bearer tokens for the Event session
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch an access token for the given client credentials
    ///
    /// An empty token is never returned as `Ok`.
    async fn fetch_access_token(&self, client_id: &str, client_secret: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// OAuth 2.0 client-credentials provider
pub struct OAuthTokenProvider {
    token_url: String,
    client: reqwest::Client,
}

impl OAuthTokenProvider {
    pub fn new(token_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            token_url: token_url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn fetch_access_token(&self, client_id: &str, client_secret: &str) -> Result<String> {
        info!("Requesting access token for client {}", client_id);

        let response = self
            .client
            .post(&self.token_url)
            .query(&[("grant_type", "client_credentials")])
            .basic_auth(client_id, Some(client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await
            .context("Token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Token request rejected: {} {}", status, body);
            bail!("Token endpoint returned {}", status);
        }

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                info!("Access token received: {}... (truncated)", truncate(&token));
                Ok(token)
            }
            _ => bail!("Token response does not contain 'access_token'"),
        }
    }
}

fn truncate(token: &str) -> &str {
    match token.char_indices().nth(8) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
