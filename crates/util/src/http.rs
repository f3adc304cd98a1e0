//! # HTTP Utilities
//!
//! Helpers for turning raw HTTP response bodies into JSON values and
//! human-readable diagnostics.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Return a user-friendly hint for common HTTP status codes.
///
/// Used as a fallback diagnostic when an error response carries no message
/// of its own.
///
/// # Example
/// ```rust
/// use formgate_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("Unauthorized"));
/// assert!(error_401.contains("oauth2-google"));
///
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: re-authorize with the oauth2-google tool".into()),
        403 => Some("Forbidden (403). Hint: check that the form is shared with the authorized account".into()),
        429 => Some("Too Many Requests (429). Hint: the Forms API quota was exceeded, retry later".into()),
        _ => None,
    }
}

/// Extract a human-readable message from a JSON error body.
///
/// Understands the Google API error envelope (`{"error": {"message": ...}}`)
/// and the OAuth2 token endpoint shape (`{"error": "...", "error_description": ...}`).
///
/// # Example
/// ```rust
/// use formgate_util::http::extract_error_message;
/// use serde_json::json;
///
/// let body = json!({"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}});
/// assert_eq!(extract_error_message(&body).as_deref(), Some("Requested entity was not found."));
///
/// let body = json!({"error": "invalid_grant", "error_description": "Bad Request"});
/// assert_eq!(extract_error_message(&body).as_deref(), Some("invalid_grant: Bad Request"));
/// ```
pub fn extract_error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    match error {
        Value::Object(details) => details
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string),
        Value::String(code) => match body.get("error_description").and_then(Value::as_str) {
            Some(description) if !description.trim().is_empty() => Some(format!("{code}: {description}")),
            _ => Some(code.clone()),
        },
        _ => None,
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// The error carries the originating HTTP status and a truncated preview
/// of the response body.
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}
