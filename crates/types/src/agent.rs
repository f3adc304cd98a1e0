//! Agent identity and OAuth credential material.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of the agent on whose behalf an operation runs.
///
/// Only ever used as a lookup key; no internal structure is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// OAuth2 token material authorizing calls to the Forms API.
///
/// A credential held by the store is treated as valid for dispatch. No local
/// expiry check is made; a 401 from the remote API is the only expiry signal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Bearer token attached to every outbound call.
    pub access_token: String,
    /// Refresh token returned by the provider, kept but never exchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry reported by the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Scopes granted with this token.
    #[serde(default)]
    pub scopes: BTreeSet<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expiry: None,
            scopes: BTreeSet::new(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Token values must never end up in logs through `{:?}`.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expiry", &self.expiry)
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token_values() {
        let credential = Credential::new("ya29.secret-access").with_refresh_token("1//secret-refresh");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("secret-access"), "rendered: {rendered}");
        assert!(!rendered.contains("secret-refresh"), "rendered: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn bearer_header_value_prefixes_scheme() {
        let credential = Credential::new("abc");
        assert_eq!(credential.bearer_header_value(), "Bearer abc");
    }

    #[test]
    fn agent_id_serializes_as_plain_string() {
        let agent = AgentId::from("agent-7");
        assert_eq!(serde_json::to_value(&agent).unwrap(), serde_json::json!("agent-7"));
        assert_eq!(agent.to_string(), "agent-7");
    }
}
