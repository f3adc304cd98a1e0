//! Result projection from dispatch outcomes to neutral results.
//!
//! Every operation has exactly one success shape and one failure shape. A
//! failure always becomes an error alert with no data attached.

use formgate_types::{
    Alert, AuthPrompt, Card, DispatchOutcome, NeutralResult, OperationKind, OperationRequest, Presentation, Table, TableColumn,
};
use formgate_util::format_locale_timestamp;
use serde_json::{Map, Value, json};

pub const AUTH_REQUIRED_SUMMARY: &str = "Authentication required";
pub const AUTH_PROMPT_TITLE: &str = "Google Authentication";
pub const AUTH_PROVIDER: &str = "google";
pub const GOOGLE_LOGO_URL: &str = "https://www.gstatic.com/images/branding/product/1x/googleg_48dp.png";
pub const ANONYMOUS_RESPONDENT: &str = "Anonymous";
const MISSING_FIELD: &str = "N/A";

/// Short-circuit result shown when the agent has no stored credential.
///
/// `kind` selects the prompt wording; `None` is used by the explicit
/// re-authorization tool.
pub fn authentication_required(kind: Option<OperationKind>, url: impl Into<String>) -> NeutralResult {
    NeutralResult {
        summary: AUTH_REQUIRED_SUMMARY.to_string(),
        data: None,
        presentation: Presentation::AuthPrompt(AuthPrompt {
            title: AUTH_PROMPT_TITLE.to_string(),
            content: auth_prompt_content(kind).to_string(),
            logo: GOOGLE_LOGO_URL.to_string(),
            url: url.into(),
            provider: AUTH_PROVIDER.to_string(),
        }),
    }
}

fn auth_prompt_content(kind: Option<OperationKind>) -> &'static str {
    match kind {
        None => "Please authenticate with Google to access Google Forms",
        Some(OperationKind::CreateForm) => "Please authenticate with Google to create forms",
        Some(OperationKind::GetForm) => "Please authenticate with Google to view forms",
        Some(OperationKind::GetResponses) => "Please authenticate with Google to view form responses",
        Some(OperationKind::UpdateForm) => "Please authenticate with Google to update forms",
        Some(OperationKind::AddItem | OperationKind::DeleteItem | OperationKind::MoveItem) => {
            "Please authenticate with Google to modify forms"
        }
    }
}

pub fn project(request: &OperationRequest, outcome: DispatchOutcome) -> NeutralResult {
    match outcome {
        DispatchOutcome::Success { payload } => project_success(request, payload),
        DispatchOutcome::Failure { diagnostic, .. } => project_failure(request.kind(), &diagnostic),
    }
}

fn project_failure(kind: OperationKind, diagnostic: &str) -> NeutralResult {
    NeutralResult {
        summary: failure_summary(kind).to_string(),
        data: None,
        presentation: Presentation::Alert(Alert::error(format!("{}: {diagnostic}", failure_action(kind)))),
    }
}

fn failure_summary(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::CreateForm => "Failed to create form",
        OperationKind::GetForm => "Failed to get form details",
        OperationKind::GetResponses => "Failed to get form responses",
        OperationKind::UpdateForm => "Failed to update form",
        OperationKind::AddItem => "Failed to add form item",
        OperationKind::DeleteItem => "Failed to delete form item",
        OperationKind::MoveItem => "Failed to move form item",
    }
}

/// Prefix of the alert message, e.g. `Failed to get form: <diagnostic>`.
fn failure_action(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::GetForm => "Failed to get form",
        OperationKind::GetResponses => "Failed to get responses",
        other => failure_summary(other),
    }
}

fn project_success(request: &OperationRequest, payload: Value) -> NeutralResult {
    match request {
        OperationRequest::CreateForm(input) => {
            let content = [
                format!("Form Title: {}", text_at(&payload, "/info/title")),
                format!("Form ID: {}", text_at(&payload, "/formId")),
                format!("Responder URL: {}", text_at(&payload, "/responderUri")),
            ]
            .join("\n");
            card_result(format!("Created form with title: {}", input.title), payload, "Form Created", content)
        }
        OperationRequest::GetForm(_) => {
            let title = text_at(&payload, "/info/title");
            let description = payload
                .pointer("/info/description")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .unwrap_or("No description")
                .to_string();
            let item_count = payload.get("items").and_then(Value::as_array).map_or(0, Vec::len);
            let content = [
                format!("Title: {title}"),
                format!("Description: {description}"),
                format!("Number of Items: {item_count}"),
                format!("Responder URL: {}", text_at(&payload, "/responderUri")),
            ]
            .join("\n");
            card_result(format!("Retrieved form: {title}"), payload, "Form Details", content)
        }
        OperationRequest::GetResponses(_) => responses_table(payload),
        OperationRequest::UpdateForm(input) => card_result(
            "Form updated successfully".to_string(),
            payload,
            "Form Updated",
            format!("Successfully updated form {}", input.form_id),
        ),
        OperationRequest::AddItem(input) => card_result(
            "Form item added successfully".to_string(),
            payload,
            "Item Added",
            format!("Successfully added new item to form {}", input.form_id),
        ),
        OperationRequest::DeleteItem(input) => card_result(
            "Form item deleted successfully".to_string(),
            payload,
            "Item Deleted",
            format!(
                "Successfully deleted item at index {} from form {}",
                input.location.index, input.form_id
            ),
        ),
        OperationRequest::MoveItem(input) => card_result(
            "Form item moved successfully".to_string(),
            payload,
            "Item Moved",
            format!(
                "Successfully moved item from index {} to {}",
                input.original_location.index, input.new_location.index
            ),
        ),
    }
}

fn card_result(summary: String, payload: Value, title: &str, content: String) -> NeutralResult {
    NeutralResult {
        summary,
        data: Some(payload),
        presentation: Presentation::Card(Card {
            title: title.to_string(),
            content,
        }),
    }
}

fn responses_table(payload: Value) -> NeutralResult {
    let responses = payload
        .get("responses")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let rows = responses.iter().map(response_row).collect();
    let table = Table {
        columns: vec![
            TableColumn::text("responseId", "Response ID"),
            TableColumn::text("createTime", "Created"),
            TableColumn::text("lastSubmittedTime", "Last Submitted"),
            TableColumn::text("respondentEmail", "Email"),
        ],
        rows,
    };

    let mut data = json!({ "responses": responses });
    if let Some(token) = payload.get("nextPageToken") {
        data["nextPageToken"] = token.clone();
    }

    NeutralResult {
        summary: format!("Retrieved {} responses", responses.len()),
        data: Some(data),
        presentation: Presentation::Table(table),
    }
}

fn response_row(response: &Value) -> Map<String, Value> {
    let timestamp = |key: &str| Value::String(format_locale_timestamp(response.get(key).and_then(Value::as_str)));
    let email = response
        .get("respondentEmail")
        .and_then(Value::as_str)
        .filter(|email| !email.is_empty())
        .unwrap_or(ANONYMOUS_RESPONDENT);

    let mut row = Map::new();
    row.insert(
        "responseId".into(),
        response.get("responseId").cloned().unwrap_or(Value::Null),
    );
    row.insert("createTime".into(), timestamp("createTime"));
    row.insert("lastSubmittedTime".into(), timestamp("lastSubmittedTime"));
    row.insert("respondentEmail".into(), Value::String(email.to_string()));
    row
}

fn text_at(payload: &Value, pointer: &str) -> String {
    match payload.pointer(pointer) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => MISSING_FIELD.to_string(),
        Some(other) => other.to_string(),
    }
}
