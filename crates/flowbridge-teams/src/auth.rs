//! Bot Framework app tokens.
//!
//! Auth flow:
//!   1. The bot's App ID and password are exchanged for an access token with
//!      the OAuth client-credentials grant.
//!   2. The token is cached in memory until shortly before it expires.
//!   3. Every outbound activity asks for the token; only an expired cache
//!      triggers a new exchange.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use flowbridge_core::config::TeamsConfig;

use crate::error::ConnectorError;

pub const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
pub const BOT_FRAMEWORK_SCOPE: &str = "https://api.botframework.com/.default";

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 120;

struct CachedToken {
    token: String,
    expires_at: i64,
}

struct AppCredentials {
    app_id: String,
    app_password: String,
}

pub struct AppTokenProvider {
    client: reqwest::Client,
    credentials: Option<AppCredentials>,
    token_url: String,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl AppTokenProvider {
    /// Provider for the configured app. Without an App ID no token is ever
    /// requested and activities go out unauthenticated (local emulator).
    pub fn new(client: reqwest::Client, config: &TeamsConfig) -> Self {
        let credentials = config
            .app_id
            .clone()
            .filter(|id| !id.is_empty())
            .map(|app_id| AppCredentials {
                app_id,
                app_password: config.app_password.clone().unwrap_or_default(),
            });
        Self {
            client,
            credentials,
            token_url: token_url(LOGIN_BASE_URL, config.authority_tenant()),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Point the token exchange at a different login host.
    pub fn with_login_base(mut self, base: &str, config: &TeamsConfig) -> Self {
        self.token_url = token_url(base, config.authority_tenant());
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Current access token, exchanging credentials when the cache is empty
    /// or about to expire. `None` when no App ID is configured.
    pub async fn token(&self) -> Result<Option<String>, ConnectorError> {
        let Some(ref creds) = self.credentials else {
            return Ok(None);
        };
        let now = chrono::Utc::now().timestamp();

        // fast path: read lock
        {
            let cached = self.cached.read().await;
            if let Some(ref c) = *cached {
                if now + EXPIRY_MARGIN_SECS < c.expires_at {
                    return Ok(Some(c.token.clone()));
                }
            }
        }

        // slow path: write lock, re-check, then exchange
        let mut cached = self.cached.write().await;
        let now = chrono::Utc::now().timestamp();
        if let Some(ref c) = *cached {
            if now + EXPIRY_MARGIN_SECS < c.expires_at {
                return Ok(Some(c.token.clone()));
            }
        }

        info!(app_id = %creds.app_id, "requesting Bot Framework access token");
        let fresh = self.exchange(creds, now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(Some(token))
    }

    async fn exchange(&self, creds: &AppCredentials, now: i64) -> Result<CachedToken, ConnectorError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", creds.app_id.as_str()),
            ("client_secret", creds.app_password.as_str()),
            ("scope", BOT_FRAMEWORK_SCOPE),
        ];
        let resp = self.client.post(&self.token_url).form(&form).send().await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ConnectorError::Auth(format!(
                "token endpoint returned {status}: {text}"
            )));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ConnectorError::Auth(format!("unreadable token response: {e}")))?;

        debug!(expires_in = body.expires_in, "Bot Framework token obtained");

        Ok(CachedToken {
            token: body.access_token,
            expires_at: now + body.expires_in,
        })
    }
}

fn token_url(base: &str, tenant: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        base.trim_end_matches('/'),
        tenant
    )
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}
