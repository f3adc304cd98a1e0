//! Error types for translation and invocation.

use formgate_api::DispatchError;
use formgate_auth::AuthError;
use formgate_types::OperationKind;
use thiserror::Error;

/// A request that cannot be shaped into an API call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("{operation}: missing required field '{field}'")]
    MissingField { operation: &'static str, field: &'static str },

    #[error("{operation}: invalid value for '{field}': {reason}")]
    InvalidValue {
        operation: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl TranslationError {
    pub fn missing_field(operation: OperationKind, field: &'static str) -> Self {
        Self::MissingField {
            operation: operation.tool_id(),
            field,
        }
    }

    pub fn invalid_value(operation: OperationKind, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            operation: operation.tool_id(),
            field,
            reason: reason.into(),
        }
    }
}

/// Faults that escape an invocation instead of becoming a [`NeutralResult`].
///
/// Remote failures never appear here; they are projected into an alert.
///
/// [`NeutralResult`]: formgate_types::NeutralResult
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Service misconfigured: {0}")]
    Configuration(#[from] AuthError),

    #[error("Invalid input for tool '{tool}': {message}")]
    InvalidInput { tool: String, message: String },

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Unknown tool: {tool}")]
    UnknownTool { tool: String },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl InvocationError {
    pub fn invalid_input(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn unknown_tool(tool: impl Into<String>) -> Self {
        Self::UnknownTool { tool: tool.into() }
    }
}
