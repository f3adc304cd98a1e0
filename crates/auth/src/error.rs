//! Error types for the credential lifecycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The authorization-flow provider could not produce a URL. The
    /// surrounding service is misconfigured; this aborts the invocation.
    #[error("Authorization URL could not be generated for provider '{provider}' (agent {agent_id})")]
    ConfigurationFault { provider: String, agent_id: String },

    #[error("Missing OAuth configuration: environment variable {variable} is not set")]
    MissingConfig { variable: String },

    #[error("Unknown or already used OAuth state")]
    UnknownState,

    #[error("Token exchange failed{}: {message}", http_status_suffix(.status))]
    TokenExchange { status: Option<u16>, message: String },

    #[error("OAuth transport error: {message}")]
    Transport { message: String },
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}

impl AuthError {
    pub fn configuration_fault(provider: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self::ConfigurationFault {
            provider: provider.into(),
            agent_id: agent_id.into(),
        }
    }

    pub fn missing_config(variable: impl Into<String>) -> Self {
        Self::MissingConfig {
            variable: variable.into(),
        }
    }

    pub fn token_exchange(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::TokenExchange {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_exchange_message_includes_status_when_known() {
        let error = AuthError::token_exchange(Some(400), "invalid_grant: Bad Request");
        assert_eq!(error.to_string(), "Token exchange failed (HTTP 400): invalid_grant: Bad Request");

        let error = AuthError::token_exchange(None, "missing access_token");
        assert_eq!(error.to_string(), "Token exchange failed: missing access_token");
    }

    #[test]
    fn configuration_fault_names_provider_and_agent() {
        let error = AuthError::configuration_fault("google", "agent-1");
        assert_eq!(
            error.to_string(),
            "Authorization URL could not be generated for provider 'google' (agent agent-1)"
        );
    }
}
