//! The presentation-neutral result contract.
//!
//! [`NeutralResult`] is the only artifact handed to the presentation layer.
//! It never carries credential data or raw dispatch outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralResult {
    /// Short human-readable summary for the agent.
    pub summary: String,
    /// Raw payload from the remote API; absent for prompts and failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Rendering hint for the presentation layer.
    pub presentation: Presentation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Presentation {
    AuthPrompt(AuthPrompt),
    Card(Card),
    Table(Table),
    Alert(Alert),
}

impl Presentation {
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert(_))
    }

    pub fn is_auth_prompt(&self) -> bool {
        matches!(self, Self::AuthPrompt(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPrompt {
    pub title: String,
    pub content: String,
    pub logo: String,
    /// Authorization URL the user must visit.
    pub url: String,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub header: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TableColumn {
    pub fn text(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            kind: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub variant: AlertVariant,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            variant: AlertVariant::Error,
            message: message.into(),
        }
    }
}
