//! Request translation: one operation in, one declarative API call out.
//!
//! Translation is pure. It never touches the network or the credential
//! store; paths are relative to the Forms collection root.

use formgate_types::{
    ApiRequest, BatchOperation, BatchUpdateRequest, CreateFormInput, FormInfoPatch, GetResponsesInput, OperationKind,
    OperationRequest, UpdateFormInput,
};
use formgate_util::encode_path_segment;
use serde::Serialize;
use serde_json::json;
use url::form_urlencoded;

use crate::error::TranslationError;

pub fn translate(request: &OperationRequest) -> Result<ApiRequest, TranslationError> {
    let kind = request.kind();
    match request {
        OperationRequest::CreateForm(input) => Ok(create_form(input)),
        OperationRequest::GetForm(input) => Ok(ApiRequest::get(form_path(kind, &input.form_id)?)),
        OperationRequest::GetResponses(input) => get_responses(input),
        OperationRequest::UpdateForm(input) => batch_update(kind, &input.form_id, update_form_operations(input)),
        OperationRequest::AddItem(input) => batch_update(
            kind,
            &input.form_id,
            vec![BatchOperation::CreateItem {
                item: input.item.clone(),
                location: input.location,
            }],
        ),
        OperationRequest::DeleteItem(input) => batch_update(
            kind,
            &input.form_id,
            vec![BatchOperation::DeleteItem {
                location: input.location,
            }],
        ),
        OperationRequest::MoveItem(input) => batch_update(
            kind,
            &input.form_id,
            vec![BatchOperation::MoveItem {
                original_location: input.original_location,
                new_location: input.new_location,
            }],
        ),
    }
}

fn create_form(input: &CreateFormInput) -> ApiRequest {
    let document_title = non_empty(input.document_title.as_deref()).unwrap_or(input.title.as_str());
    ApiRequest::post(
        "",
        json!({
            "info": {
                "title": input.title,
                "documentTitle": document_title,
            }
        }),
    )
}

fn get_responses(input: &GetResponsesInput) -> Result<ApiRequest, TranslationError> {
    let mut path = format!("{}/responses", form_path(OperationKind::GetResponses, &input.form_id)?);

    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut has_params = false;
    if let Some(page_size) = input.page_size {
        query.append_pair("pageSize", &page_size.to_string());
        has_params = true;
    }
    if let Some(page_token) = non_empty(input.page_token.as_deref()) {
        query.append_pair("pageToken", page_token);
        has_params = true;
    }
    if let Some(filter) = non_empty(input.filter.as_deref()) {
        query.append_pair("filter", filter);
        has_params = true;
    }
    if has_params {
        path.push('?');
        path.push_str(&query.finish());
    }

    Ok(ApiRequest::get(path))
}

/// At most one info patch and one settings patch, each masked to exactly
/// the fields supplied.
fn update_form_operations(input: &UpdateFormInput) -> Vec<BatchOperation> {
    let mut operations = Vec::new();

    let title = non_empty(input.title.as_deref());
    let description = non_empty(input.description.as_deref());
    if title.is_some() || description.is_some() {
        let mut mask = Vec::new();
        if title.is_some() {
            mask.push("title");
        }
        if description.is_some() {
            mask.push("description");
        }
        operations.push(BatchOperation::UpdateFormInfo {
            info: FormInfoPatch {
                title: title.map(str::to_string),
                description: description.map(str::to_string),
            },
            update_mask: mask.join(","),
        });
    }

    if let Some(settings) = &input.settings {
        operations.push(BatchOperation::UpdateSettings {
            update_mask: settings.present_keys().join(","),
            settings: settings.clone(),
        });
    }

    operations
}

fn batch_update(kind: OperationKind, form_id: &str, requests: Vec<BatchOperation>) -> Result<ApiRequest, TranslationError> {
    let path = format!("{}:batchUpdate", form_path(kind, form_id)?);
    let body = to_body(kind, &BatchUpdateRequest { requests })?;
    Ok(ApiRequest::post(path, body))
}

fn form_path(kind: OperationKind, form_id: &str) -> Result<String, TranslationError> {
    if form_id.trim().is_empty() {
        return Err(TranslationError::missing_field(kind, "formId"));
    }
    Ok(format!("/{}", encode_path_segment(form_id)))
}

fn to_body(kind: OperationKind, value: &impl Serialize) -> Result<serde_json::Value, TranslationError> {
    serde_json::to_value(value).map_err(|error| TranslationError::invalid_value(kind, "body", error.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
