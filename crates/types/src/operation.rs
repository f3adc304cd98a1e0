//! Operation requests accepted from agents and the wire shapes they map to.
//!
//! Input structs use camelCase field names so that agent-supplied JSON maps
//! onto them directly, and so that item and settings definitions can be
//! forwarded to the Forms API without re-shaping.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of operations exposed to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    CreateForm,
    GetForm,
    GetResponses,
    UpdateForm,
    AddItem,
    DeleteItem,
    MoveItem,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::CreateForm,
        OperationKind::GetForm,
        OperationKind::GetResponses,
        OperationKind::UpdateForm,
        OperationKind::AddItem,
        OperationKind::DeleteItem,
        OperationKind::MoveItem,
    ];

    /// Stable tool identifier used by agents to invoke the operation.
    pub fn tool_id(self) -> &'static str {
        match self {
            Self::CreateForm => "create-form",
            Self::GetForm => "get-form",
            Self::GetResponses => "get-responses",
            Self::UpdateForm => "update-form",
            Self::AddItem => "add-form-item",
            Self::DeleteItem => "delete-form-item",
            Self::MoveItem => "move-form-item",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CreateForm => "Create Form",
            Self::GetForm => "Get Form",
            Self::GetResponses => "Get Form Responses",
            Self::UpdateForm => "Update Form",
            Self::AddItem => "Add Form Item",
            Self::DeleteItem => "Delete Form Item",
            Self::MoveItem => "Move Form Item",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CreateForm => "Create a new Google Form",
            Self::GetForm => "Get details of a Google Form",
            Self::GetResponses => "Get all responses for a Google Form",
            Self::UpdateForm => "Update an existing Google Form",
            Self::AddItem => "Add a new item (question, text, etc) to a Google Form",
            Self::DeleteItem => "Delete an item from a Google Form",
            Self::MoveItem => "Move an item to a new position in a Google Form",
        }
    }

    pub fn from_tool_id(tool_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tool_id() == tool_id)
    }
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormInput {
    #[schemars(description = "The title of the form")]
    pub title: String,
    #[schemars(description = "The document title visible in Drive")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetFormInput {
    #[schemars(description = "The ID of the form to retrieve")]
    pub form_id: String,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetResponsesInput {
    #[schemars(description = "The ID of the form to get responses for")]
    pub form_id: String,
    #[schemars(description = "Maximum number of responses to return (max 5000)")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[schemars(description = "Page token for pagination")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[schemars(description = "Filter responses by timestamp")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormInput {
    #[schemars(description = "The ID of the form to update")]
    pub form_id: String,
    #[schemars(description = "New title for the form")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[schemars(description = "New description for the form")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<FormSettings>,
}

/// Form-level settings. Only the keys present are sent and listed in the update mask.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_settings: Option<QuizSettings>,
    #[schemars(description = "Email collection settings")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_collection_type: Option<EmailCollectionType>,
}

impl FormSettings {
    /// Top-level keys present in this settings object, in declaration order.
    pub fn present_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.quiz_settings.is_some() {
            keys.push("quizSettings");
        }
        if self.email_collection_type.is_some() {
            keys.push("emailCollectionType");
        }
        keys
    }
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[schemars(description = "Whether this form is a quiz")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quiz: Option<bool>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailCollectionType {
    DoNotCollect,
    Verified,
    ResponderInput,
}

/// Zero-based position of an item within a form.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub index: u32,
}

impl Location {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddItemInput {
    #[schemars(description = "The ID of the form to add item to")]
    pub form_id: String,
    pub item: Item,
    #[schemars(description = "Index where to insert the item")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Item definition forwarded verbatim inside a `createItem` batch operation.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[schemars(description = "Title/question text")]
    pub title: String,
    #[schemars(description = "Description/help text")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_item: Option<QuestionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_break_item: Option<EmptyItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_item: Option<EmptyItem>,
}

/// Marker object for item kinds that carry no fields (`{}` on the wire).
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct EmptyItem {}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub question: Question,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_question: Option<ChoiceQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_question: Option<TextQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_question: Option<ScaleQuestion>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    #[serde(rename = "type")]
    pub kind: ChoiceType,
    pub options: Vec<ChoiceOption>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceType {
    Radio,
    Checkbox,
    DropDown,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TextQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<bool>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleQuestion {
    pub low: i64,
    pub high: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_label: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemInput {
    #[schemars(description = "The ID of the form")]
    pub form_id: String,
    #[schemars(description = "Index of the item to delete")]
    pub location: Location,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemInput {
    #[schemars(description = "The ID of the form")]
    pub form_id: String,
    #[schemars(description = "Current index of the item")]
    pub original_location: Location,
    #[schemars(description = "New index for the item")]
    pub new_location: Location,
}

/// A validated request for one of the seven operations.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    CreateForm(CreateFormInput),
    GetForm(GetFormInput),
    GetResponses(GetResponsesInput),
    UpdateForm(UpdateFormInput),
    AddItem(AddItemInput),
    DeleteItem(DeleteItemInput),
    MoveItem(MoveItemInput),
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateForm(_) => OperationKind::CreateForm,
            Self::GetForm(_) => OperationKind::GetForm,
            Self::GetResponses(_) => OperationKind::GetResponses,
            Self::UpdateForm(_) => OperationKind::UpdateForm,
            Self::AddItem(_) => OperationKind::AddItem,
            Self::DeleteItem(_) => OperationKind::DeleteItem,
            Self::MoveItem(_) => OperationKind::MoveItem,
        }
    }

    /// Form identifier targeted by the request; `None` for form creation.
    pub fn form_id(&self) -> Option<&str> {
        match self {
            Self::CreateForm(_) => None,
            Self::GetForm(input) => Some(&input.form_id),
            Self::GetResponses(input) => Some(&input.form_id),
            Self::UpdateForm(input) => Some(&input.form_id),
            Self::AddItem(input) => Some(&input.form_id),
            Self::DeleteItem(input) => Some(&input.form_id),
            Self::MoveItem(input) => Some(&input.form_id),
        }
    }
}

/// Info fields changed by an `updateFormInfo` operation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct FormInfoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One atomic mutation inside a `batchUpdate` call.
///
/// Serializes externally tagged, e.g. `{"moveItem": {"originalLocation": {...}, "newLocation": {...}}}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BatchOperation {
    CreateItem {
        item: Item,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    DeleteItem {
        location: Location,
    },
    MoveItem {
        original_location: Location,
        new_location: Location,
    },
    UpdateFormInfo {
        info: FormInfoPatch,
        update_mask: String,
    },
    UpdateSettings {
        settings: FormSettings,
        update_mask: String,
    },
}

/// Body of `POST {base}/{formId}:batchUpdate`.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct BatchUpdateRequest {
    pub requests: Vec<BatchOperation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
}

impl ApiMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Declarative description of one outbound call, relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    /// Path (and query string, when present) appended to the API root.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: ApiMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: ApiMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn move_item_serializes_with_camel_case_locations() {
        let operation = BatchOperation::MoveItem {
            original_location: Location::new(2),
            new_location: Location::new(0),
        };
        assert_eq!(
            serde_json::to_value(&operation).unwrap(),
            json!({"moveItem": {"originalLocation": {"index": 2}, "newLocation": {"index": 0}}})
        );
    }

    #[test]
    fn create_item_omits_absent_location() {
        let operation = BatchOperation::CreateItem {
            item: Item {
                title: "Favourite colour?".into(),
                description: None,
                question_item: None,
                page_break_item: None,
                text_item: Some(EmptyItem {}),
            },
            location: None,
        };
        assert_eq!(
            serde_json::to_value(&operation).unwrap(),
            json!({"createItem": {"item": {"title": "Favourite colour?", "textItem": {}}}})
        );
    }

    #[test]
    fn item_input_accepts_choice_question_shape() {
        let item: Item = serde_json::from_value(json!({
            "title": "Pick one",
            "questionItem": {
                "question": {
                    "required": true,
                    "choiceQuestion": { "type": "DROP_DOWN", "options": [{ "value": "a" }, { "value": "b" }] }
                }
            }
        }))
        .expect("item parses");

        let choice = item.question_item.unwrap().question.choice_question.unwrap();
        assert_eq!(choice.kind, ChoiceType::DropDown);
        assert_eq!(choice.options.len(), 2);
    }

    #[test]
    fn negative_location_index_is_rejected() {
        let parsed = serde_json::from_value::<DeleteItemInput>(json!({"formId": "f", "location": {"index": -1}}));
        assert!(parsed.is_err());
    }

    #[test]
    fn settings_present_keys_follow_supplied_fields() {
        let settings = FormSettings {
            quiz_settings: None,
            email_collection_type: Some(EmailCollectionType::Verified),
        };
        assert_eq!(settings.present_keys(), vec!["emailCollectionType"]);
        assert!(FormSettings::default().present_keys().is_empty());
    }

    #[test]
    fn tool_ids_round_trip_through_lookup() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_tool_id(kind.tool_id()), Some(kind));
        }
        assert_eq!(OperationKind::from_tool_id("delete-form"), None);
    }
}
