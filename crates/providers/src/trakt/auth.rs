//! Trakt OAuth token management.
//!
//! The token lives in its own JSON file, never in the configuration. On the
//! first [`bearer`](CredentialProvider::bearer) call of a run the file is
//! read; an expired token is refreshed, and without a usable token the
//! device-code flow asks the operator to authorize the application.

use crate::error::{ErrorKind, Result};
use crate::http;
use async_trait::async_trait;
use emberly_config::TraktConfig;
use emberly_library::provider::CredentialProvider;
use emberly_library::provider::error::{ErrorKind as ProviderErrorKind, Result as ProviderResult};
use exn::ResultExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Backoff added to the poll interval when Trakt asks us to slow down.
const SLOW_DOWN: Duration = Duration::from_secs(5);

/// A Trakt access token as persisted in the token file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp of issue.
    pub created_at: i64,
    /// Lifetime in seconds.
    pub expires_in: i64,
}
impl Token {
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.created_at.saturating_add(self.expires_in) > now.unix_timestamp()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(OffsetDateTime::now_utc())
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCode {
    device_code: String,
    user_code: String,
    verification_url: String,
    expires_in: u64,
    interval: u64,
}

/// [`CredentialProvider`] for Trakt.
///
/// The token is memoized for the lifetime of the value, so a run performs at
/// most one refresh or authorization.
pub struct TraktAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    token_file: PathBuf,
    base_url: String,
    token: Mutex<Option<Token>>,
}
impl TraktAuth {
    pub fn new(client: Client, config: &TraktConfig, token_file: impl Into<PathBuf>) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_file: token_file.into(),
            base_url: super::BASE_URL.to_string(),
            token: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    /// A valid token from memory, the token file, a refresh, or the device
    /// flow, in that order.
    pub async fn token(&self) -> Result<Token> {
        let mut memo = self.token.lock().await;
        if let Some(token) = memo.as_ref()
            && token.is_valid()
        {
            return Ok(token.clone());
        }
        let token = match load_token(&self.token_file).await? {
            Some(token) if token.is_valid() => {
                tracing::debug!(path = %self.token_file.display(), "Using stored Trakt token");
                token
            },
            Some(Token { refresh_token: Some(refresh), .. }) => {
                let token = match self.refresh(&refresh).await {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::warn!(error = ?e, "Refreshing Trakt token failed; starting device authorization");
                        self.authorize().await?
                    },
                };
                self.persist(token).await?
            },
            _ => {
                let token = self.authorize().await?;
                self.persist(token).await?
            },
        };
        *memo = Some(token.clone());
        Ok(token)
    }

    async fn persist(&self, token: Token) -> Result<Token> {
        save_token(&self.token_file, &token).await?;
        tracing::info!(path = %self.token_file.display(), "Saved Trakt token");
        Ok(token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        tracing::info!("Refreshing expired Trakt token");
        let url = self.url("/oauth/token");
        let request = self.client.post(&url).json(&json!({
            "refresh_token": refresh_token,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "redirect_uri": "urn:ietf:wg:oauth:2.0:oob",
            "grant_type": "refresh_token",
        }));
        http::get_json(request, &url).await
    }

    /// Run the device-code flow until the operator authorizes the
    /// application, Trakt refuses, or the code expires.
    async fn authorize(&self) -> Result<Token> {
        let url = self.url("/oauth/device/code");
        let request = self.client.post(&url).json(&json!({ "client_id": self.client_id }));
        let code: DeviceCode = http::get_json(request, &url).await?;
        tracing::warn!(
            url = %code.verification_url,
            code = %code.user_code,
            "Trakt authorization required: visit {} and enter code {}",
            code.verification_url,
            code.user_code,
        );

        let url = self.url("/oauth/device/token");
        let body = json!({
            "code": code.device_code,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
        });
        let deadline = tokio::time::Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = Duration::from_secs(code.interval.max(1));
        while tokio::time::Instant::now() + interval < deadline {
            tokio::time::sleep(interval).await;
            let response = http::send(self.client.post(&url).json(&body), &url).await?;
            match response.status() {
                status if status.is_success() => {
                    tracing::info!("Trakt authorization granted");
                    return http::read_json(response, &url).await;
                },
                StatusCode::BAD_REQUEST => tracing::debug!("Trakt authorization pending"),
                StatusCode::TOO_MANY_REQUESTS => {
                    interval += SLOW_DOWN;
                    tracing::debug!(interval_secs = interval.as_secs(), "Slowing down Trakt polling");
                },
                status => {
                    tracing::error!(status = status.as_u16(), "Trakt refused the device authorization");
                    exn::bail!(ErrorKind::Authorization);
                },
            }
        }
        tracing::error!("Trakt device code expired before authorization");
        exn::bail!(ErrorKind::Authorization)
    }
}

#[async_trait]
impl CredentialProvider for TraktAuth {
    fn name(&self) -> &str {
        "trakt"
    }

    async fn bearer(&self) -> ProviderResult<String> {
        let token = self.token().await.or_raise(|| ProviderErrorKind::Credential)?;
        Ok(token.access_token)
    }
}

/// Read a token file. A missing file is `None`; an unreadable or corrupt one
/// is an error rather than a silent re-authorization.
pub(crate) async fn load_token(path: &Path) -> Result<Option<Token>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).or_raise(|| ErrorKind::Token(path.to_path_buf())),
    };
    http::decode(&bytes).or_raise(|| ErrorKind::Token(path.to_path_buf())).map(Some)
}

pub(crate) async fn save_token(path: &Path, token: &Token) -> Result<()> {
    let raise = || ErrorKind::Token(path.to_path_buf());
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.or_raise(raise)?;
    }
    let bytes = serde_json::to_vec_pretty(token).or_raise(raise)?;
    tokio::fs::write(path, bytes).await.or_raise(raise)
}
