//! Tool catalog exposed to agents.
//!
//! Each operation is published under a stable id with a JSON Schema derived
//! from its typed input. `oauth2-google` is the explicit re-authorization
//! entry point.

use formgate_types::{
    AddItemInput, CreateFormInput, DeleteItemInput, GetFormInput, GetResponsesInput, MoveItemInput, OperationKind,
    OperationRequest, UpdateFormInput,
};
use schemars::schema_for;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::InvocationError;

pub const OAUTH_TOOL_ID: &str = "oauth2-google";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// All tools, the re-authorization tool first.
pub fn tool_catalog() -> Vec<ToolDescriptor> {
    let mut tools = vec![ToolDescriptor {
        id: OAUTH_TOOL_ID,
        name: "Google OAuth2",
        description: "Authenticate with Google to grant access to Google Forms",
        input_schema: json!({"type": "object", "properties": {}}),
    }];
    tools.extend(OperationKind::ALL.into_iter().map(|kind| ToolDescriptor {
        id: kind.tool_id(),
        name: kind.display_name(),
        description: kind.description(),
        input_schema: input_schema(kind),
    }));
    tools
}

fn input_schema(kind: OperationKind) -> Value {
    match kind {
        OperationKind::CreateForm => schema_for!(CreateFormInput).to_value(),
        OperationKind::GetForm => schema_for!(GetFormInput).to_value(),
        OperationKind::GetResponses => schema_for!(GetResponsesInput).to_value(),
        OperationKind::UpdateForm => schema_for!(UpdateFormInput).to_value(),
        OperationKind::AddItem => schema_for!(AddItemInput).to_value(),
        OperationKind::DeleteItem => schema_for!(DeleteItemInput).to_value(),
        OperationKind::MoveItem => schema_for!(MoveItemInput).to_value(),
    }
}

/// Deserialize agent-supplied arguments into a typed request.
///
/// A `null` argument payload is treated as an empty object.
pub fn parse_arguments(kind: OperationKind, arguments: Value) -> Result<OperationRequest, InvocationError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    let request = match kind {
        OperationKind::CreateForm => OperationRequest::CreateForm(decode(kind, arguments)?),
        OperationKind::GetForm => OperationRequest::GetForm(decode(kind, arguments)?),
        OperationKind::GetResponses => OperationRequest::GetResponses(decode(kind, arguments)?),
        OperationKind::UpdateForm => OperationRequest::UpdateForm(decode(kind, arguments)?),
        OperationKind::AddItem => OperationRequest::AddItem(decode(kind, arguments)?),
        OperationKind::DeleteItem => OperationRequest::DeleteItem(decode(kind, arguments)?),
        OperationKind::MoveItem => OperationRequest::MoveItem(decode(kind, arguments)?),
    };
    Ok(request)
}

fn decode<T: DeserializeOwned>(kind: OperationKind, arguments: Value) -> Result<T, InvocationError> {
    serde_json::from_value(arguments).map_err(|error| InvocationError::invalid_input(kind.tool_id(), error.to_string()))
}
