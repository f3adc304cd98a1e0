//! Invocation pipeline: auth gate, translation, dispatch, projection.

use std::sync::Arc;
use std::time::Instant;

use formgate_api::Dispatch;
use formgate_auth::{AuthDecision, AuthGate};
use formgate_types::{AgentId, NeutralResult, OperationKind, OperationRequest};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::InvocationError;
use crate::project::{authentication_required, project};
use crate::tools::{OAUTH_TOOL_ID, parse_arguments};
use crate::translate::translate;
use crate::validate::validate;

/// Runs operations on behalf of agents.
///
/// Holds the injected auth gate (and through it the credential store) and
/// the dispatcher; there is no other shared state between invocations.
pub struct FormsService {
    gate: AuthGate,
    dispatcher: Arc<dyn Dispatch>,
}

impl FormsService {
    pub fn new(gate: AuthGate, dispatcher: Arc<dyn Dispatch>) -> Self {
        Self { gate, dispatcher }
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Run one operation to a terminal [`NeutralResult`].
    ///
    /// Remote failures become alerts. Only configuration faults, invalid
    /// input and local request-construction faults are returned as errors.
    pub async fn invoke(&self, agent: &AgentId, request: OperationRequest) -> Result<NeutralResult, InvocationError> {
        let kind = request.kind();
        validate(&request)?;

        let credential = match self.gate.authorize(agent).await? {
            AuthDecision::Authorized(credential) => credential,
            AuthDecision::Unauthenticated { url } => {
                info!(agent_id = %agent, operation = kind.tool_id(), "operation halted pending authentication");
                return Ok(authentication_required(Some(kind), url));
            }
        };

        let api_request = translate(&request)?;
        let start = Instant::now();
        let outcome = self.dispatcher.dispatch(&api_request, &credential).await?;
        debug!(
            agent_id = %agent,
            operation = kind.tool_id(),
            success = outcome.is_success(),
            duration_ms = start.elapsed().as_millis(),
            "operation dispatched"
        );

        Ok(project(&request, outcome))
    }

    /// Always produce a fresh authorization prompt, whether or not a
    /// credential is already stored.
    pub async fn reauthorize(&self, agent: &AgentId) -> Result<NeutralResult, InvocationError> {
        let url = self.gate.authorization_url(agent).await?;
        info!(agent_id = %agent, "re-authorization requested");
        Ok(authentication_required(None, url))
    }

    /// Resolve a tool id, parse its JSON arguments and run it.
    pub async fn invoke_tool(&self, tool_id: &str, agent: &AgentId, arguments: Value) -> Result<NeutralResult, InvocationError> {
        if tool_id == OAUTH_TOOL_ID {
            return self.reauthorize(agent).await;
        }
        let kind = OperationKind::from_tool_id(tool_id).ok_or_else(|| InvocationError::unknown_tool(tool_id))?;
        let request = parse_arguments(kind, arguments)?;
        self.invoke(agent, request).await
    }
}
