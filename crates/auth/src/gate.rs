//! Per-invocation authorization check.

use std::sync::Arc;

use async_trait::async_trait;
use formgate_types::{AgentId, Credential};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::store::CredentialStore;

/// External authorization-flow provider.
///
/// Returns `None` when no URL can be produced for the named provider, which
/// the gate treats as a configuration fault.
#[async_trait]
pub trait AuthUrlProvider: Send + Sync {
    async fn generate_auth_url(&self, provider: &str, agent: &AgentId) -> Option<String>;
}

/// Provider used when OAuth client settings are absent. Never yields a URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredProvider;

#[async_trait]
impl AuthUrlProvider for UnconfiguredProvider {
    async fn generate_auth_url(&self, _provider: &str, _agent: &AgentId) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthDecision {
    Authorized(Credential),
    /// No credential is stored; the caller must show `url` and stop.
    Unauthenticated { url: String },
}

pub struct AuthGate {
    store: Arc<CredentialStore>,
    provider: Arc<dyn AuthUrlProvider>,
    provider_name: String,
}

impl AuthGate {
    pub fn new(store: Arc<CredentialStore>, provider: Arc<dyn AuthUrlProvider>, provider_name: impl Into<String>) -> Self {
        Self {
            store,
            provider,
            provider_name: provider_name.into(),
        }
    }

    pub async fn authorize(&self, agent: &AgentId) -> Result<AuthDecision, AuthError> {
        if let Some(credential) = self.store.get(agent).await {
            debug!(agent_id = %agent, "credential found");
            return Ok(AuthDecision::Authorized(credential));
        }
        let url = self.authorization_url(agent).await?;
        info!(agent_id = %agent, provider = %self.provider_name, "authentication required");
        Ok(AuthDecision::Unauthenticated { url })
    }

    /// Ask the provider for a fresh authorization URL regardless of stored state.
    pub async fn authorization_url(&self, agent: &AgentId) -> Result<String, AuthError> {
        match self.provider.generate_auth_url(&self.provider_name, agent).await {
            Some(url) => Ok(url),
            None => {
                warn!(agent_id = %agent, provider = %self.provider_name, "authorization url unavailable");
                Err(AuthError::configuration_fault(&self.provider_name, agent.as_str()))
            }
        }
    }
}
