pub mod date_handling;
pub mod http;
pub mod path_encoding;

pub use date_handling::format_locale_timestamp;
pub use http::{JsonParseError, extract_error_message, parse_response_json_strict, status_error_message};
pub use path_encoding::encode_path_segment;

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )((?:bearer |basic )?[\w\-\.=:/+~]+)",
        r"(?i)(bearer )([\w\-\.=:/+~]+)",
        r#"(?i)("(?:access|refresh|id)_token"\s*:\s*")([^"]+)"#,
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD))=([^\s&]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SENSITIVE_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let prefix = if prefix.ends_with('=') || prefix.ends_with(' ') || prefix.ends_with('"') {
                    prefix.to_string()
                } else {
                    format!("{prefix}=")
                };
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::redact_sensitive;

    #[test]
    fn redacts_bearer_tokens() {
        let redacted = redact_sensitive("request failed: Authorization: Bearer ya29.a0AfH6SMB");
        assert!(!redacted.contains("ya29"), "redacted: {redacted}");
    }

    #[test]
    fn redacts_token_fields_in_json_bodies() {
        let redacted = redact_sensitive(r#"{"access_token":"ya29.abc","expires_in":3599}"#);
        assert_eq!(redacted, r#"{"access_token":"<redacted>","expires_in":3599}"#);
    }

    #[test]
    fn redacts_env_style_secrets() {
        let redacted = redact_sensitive("GOOGLE_CLIENT_SECRET=shhh other=value");
        assert_eq!(redacted, "GOOGLE_CLIENT_SECRET=<redacted> other=value");
    }

    #[test]
    fn leaves_plain_messages_untouched() {
        let message = "Requested entity was not found.";
        assert_eq!(redact_sensitive(message), message);
    }
}
