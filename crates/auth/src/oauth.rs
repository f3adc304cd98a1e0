//! Google OAuth2 authorization-code flow.
//!
//! [`GoogleOAuthProvider::generate_auth_url`] remembers a random `state` for
//! the requesting agent. When the redirect comes back,
//! [`GoogleOAuthProvider::complete_authorization`] consumes that state,
//! exchanges the code at the token endpoint and hands the credential to the
//! store. This is the only place credentials are produced.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use formgate_types::{AgentId, Credential};
use formgate_util::{extract_error_message, redact_sensitive};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::AuthError;
use crate::gate::AuthUrlProvider;
use crate::store::CredentialStore;

pub const GOOGLE_PROVIDER: &str = "google";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/forms.body",
    "https://www.googleapis.com/auth/drive.file",
    "email",
    "profile",
];

const CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "GOOGLE_CLIENT_SECRET";
const TUNNEL_URL_ENV: &str = "TUNNEL_URL";
const DEFAULT_TUNNEL_URL: &str = "http://localhost:2022";
pub const GOOGLE_CALLBACK_PATH: &str = "/oauth2/callback/google";
const STATE_LENGTH: usize = 32;
const STATE_TTL: Duration = Duration::from_secs(10 * 60);
const TOKEN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuth2ProviderConfig {
    /// Google settings from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and `TUNNEL_URL`.
    pub fn google_from_env() -> Result<Self, AuthError> {
        let client_id = required_env(CLIENT_ID_ENV)?;
        let client_secret = required_env(CLIENT_SECRET_ENV)?;
        let tunnel_url = env::var(TUNNEL_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TUNNEL_URL.to_string());

        Ok(Self {
            client_id,
            client_secret,
            authorization_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            redirect_uri: format!("{}{GOOGLE_CALLBACK_PATH}", tunnel_url.trim_end_matches('/')),
            scopes: GOOGLE_SCOPES.iter().map(|scope| scope.to_string()).collect(),
        })
    }
}

fn required_env(name: &str) -> Result<String, AuthError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AuthError::missing_config(name))
}

pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

struct PendingAuthorization {
    agent: AgentId,
    issued_at: Instant,
}

pub struct GoogleOAuthProvider {
    config: OAuth2ProviderConfig,
    store: Arc<CredentialStore>,
    pending: Mutex<HashMap<String, PendingAuthorization>>,
    state_ttl: Duration,
    http: reqwest::Client,
}

impl GoogleOAuthProvider {
    pub fn new(config: OAuth2ProviderConfig, store: Arc<CredentialStore>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_EXCHANGE_TIMEOUT)
            .build()
            .map_err(|error| AuthError::transport(error.to_string()))?;
        Ok(Self {
            config,
            store,
            pending: Mutex::new(HashMap::new()),
            state_ttl: STATE_TTL,
            http,
        })
    }

    fn build_auth_url(&self, state: &str) -> Option<String> {
        let scopes = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorization_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", scopes.as_str()),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .ok()?;
        Some(url.into())
    }

    /// Finish the flow for a redirect carrying `state` and `code`.
    ///
    /// The state is consumed whether or not the exchange succeeds. States
    /// older than ten minutes are rejected like unknown ones.
    pub async fn complete_authorization(&self, state: &str, code: &str) -> Result<Credential, AuthError> {
        let pending = self.pending.lock().await.remove(state).ok_or(AuthError::UnknownState)?;
        if pending.issued_at.elapsed() >= self.state_ttl {
            warn!(agent_id = %pending.agent, "authorization state expired");
            return Err(AuthError::UnknownState);
        }
        let agent = pending.agent;
        let start = Instant::now();
        debug!(agent_id = %agent, "exchanging authorization code");

        let credential = match self.exchange_code(code).await {
            Ok(credential) => credential,
            Err(error) => {
                warn!(
                    agent_id = %agent,
                    duration_ms = start.elapsed().as_millis(),
                    error = %error,
                    "authorization code exchange failed"
                );
                return Err(error);
            }
        };

        self.on_auth_success(&agent, credential.clone()).await;
        info!(
            agent_id = %agent,
            duration_ms = start.elapsed().as_millis(),
            scopes = credential.scopes.len(),
            "authorization completed"
        );
        Ok(credential)
    }

    /// Callback invoked once a credential has been obtained for an agent.
    pub async fn on_auth_success(&self, agent: &AgentId, credential: Credential) {
        self.store.set(agent, credential).await;
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.trim()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|error| AuthError::transport(redact_sensitive(&error.to_string())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| AuthError::transport(redact_sensitive(&error.to_string())))?;

        if !status.is_success() {
            let message = serde_json::from_str(&body)
                .ok()
                .and_then(|value| extract_error_message(&value))
                .unwrap_or_else(|| format!("token endpoint returned status {}", status.as_u16()));
            return Err(AuthError::token_exchange(Some(status.as_u16()), redact_sensitive(&message)));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|error| {
            AuthError::token_exchange(Some(status.as_u16()), format!("invalid token response: {error}"))
        })?;
        credential_from_token(token)
            .ok_or_else(|| AuthError::token_exchange(Some(status.as_u16()), "token response missing access_token"))
    }
}

fn credential_from_token(token: TokenResponse) -> Option<Credential> {
    let access_token = token.access_token.filter(|value| !value.trim().is_empty())?;
    let mut credential = Credential::new(access_token);
    if let Some(refresh_token) = token.refresh_token.filter(|value| !value.trim().is_empty()) {
        credential = credential.with_refresh_token(refresh_token);
    }
    if let Some(expiry) = token.expires_in.and_then(expiry_after) {
        credential = credential.with_expiry(expiry);
    }
    if let Some(scope) = token.scope {
        credential = credential.with_scopes(scope.split_whitespace());
    }
    Some(credential)
}

/// Absolute expiry for a relative `expires_in`; `None` when non-positive or
/// outside the representable range.
fn expiry_after(seconds: i64) -> Option<DateTime<Utc>> {
    if seconds <= 0 {
        return None;
    }
    let lifetime = TimeDelta::try_seconds(seconds)?;
    Utc::now().checked_add_signed(lifetime)
}

#[async_trait]
impl AuthUrlProvider for GoogleOAuthProvider {
    async fn generate_auth_url(&self, provider: &str, agent: &AgentId) -> Option<String> {
        if provider != GOOGLE_PROVIDER {
            warn!(provider, "unsupported authorization provider");
            return None;
        }
        let state = generate_state();
        let url = self.build_auth_url(&state)?;
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, entry| entry.issued_at.elapsed() < self.state_ttl);
        let expired = before - pending.len();
        pending.insert(
            state,
            PendingAuthorization {
                agent: agent.clone(),
                issued_at: Instant::now(),
            },
        );
        debug!(agent_id = %agent, pending = pending.len(), expired, "authorization flow started");
        Some(url)
    }
}
