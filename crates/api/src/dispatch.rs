//! Authenticated dispatch of a single Forms API call.
//!
//! Every ordinary remote failure (non-2xx status, transport error, timeout,
//! unparsable body) is folded into [`DispatchOutcome::Failure`]. Only a
//! request that could not be constructed locally surfaces as an error.

use std::time::Instant;

use async_trait::async_trait;
use formgate_types::{ApiMethod, ApiRequest, Credential, DispatchOutcome};
use formgate_util::{extract_error_message, parse_response_json_strict, redact_sensitive, status_error_message};
use reqwest::{Method, StatusCode, header};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::FormsClient;

/// Sends one outbound call with the caller's credential attached.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, request: &ApiRequest, credential: &Credential) -> Result<DispatchOutcome, DispatchError>;
}

/// Local faults that prevent a request from being sent at all.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Request construction failed for {method} {path}: {message}")]
    RequestConstruction {
        method: &'static str,
        path: String,
        message: String,
    },
}

impl DispatchError {
    pub fn request_construction(request: &ApiRequest, message: impl Into<String>) -> Self {
        Self::RequestConstruction {
            method: request.method.as_str(),
            path: request.path.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Dispatch for FormsClient {
    async fn dispatch(&self, request: &ApiRequest, credential: &Credential) -> Result<DispatchOutcome, DispatchError> {
        let start = Instant::now();
        let method = match request.method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
        };
        debug!(
            method = %method,
            path = %request.path,
            has_body = request.body.is_some(),
            "dispatch started"
        );

        let mut builder = self
            .http()
            .request(method.clone(), self.url_for(&request.path))
            .header(header::AUTHORIZATION, credential.bearer_header_value())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) if error.is_builder() => {
                return Err(DispatchError::request_construction(
                    request,
                    redact_sensitive(&error.to_string()),
                ));
            }
            Err(error) => {
                let diagnostic = self.transport_diagnostic(&error);
                warn!(
                    method = %method,
                    path = %request.path,
                    timeout = error.is_timeout(),
                    duration_ms = start.elapsed().as_millis(),
                    error = %diagnostic,
                    "dispatch transport failure"
                );
                return Ok(DispatchOutcome::failure(diagnostic));
            }
        };

        let status = response.status();
        let body_text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                let diagnostic = self.transport_diagnostic(&error);
                warn!(
                    method = %method,
                    path = %request.path,
                    status = %status,
                    duration_ms = start.elapsed().as_millis(),
                    error = %diagnostic,
                    "dispatch body read failed"
                );
                return Ok(DispatchOutcome::Failure {
                    diagnostic,
                    status: Some(status.as_u16()),
                    raw: None,
                });
            }
        };

        let outcome = classify_response(status, &body_text);
        match &outcome {
            DispatchOutcome::Success { .. } => debug!(
                method = %method,
                path = %request.path,
                status = %status,
                duration_ms = start.elapsed().as_millis(),
                "dispatch completed"
            ),
            DispatchOutcome::Failure { diagnostic, .. } => warn!(
                method = %method,
                path = %request.path,
                status = %status,
                duration_ms = start.elapsed().as_millis(),
                error = %diagnostic,
                "dispatch failed"
            ),
        }
        Ok(outcome)
    }
}

impl FormsClient {
    fn transport_diagnostic(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            return format!("Request timed out after {}s", self.timeout().as_secs_f64());
        }
        if error.is_connect() {
            return "Network error: could not connect to the Forms API".to_string();
        }
        redact_sensitive(&format!("Network error: {error}"))
    }
}

/// Classify a received response into success or failure.
///
/// A 2xx status with a JSON body is a success. For everything else the
/// diagnostic comes from the error body when it carries a message, then a
/// status hint, then a generic status line.
fn classify_response(status: StatusCode, body_text: &str) -> DispatchOutcome {
    if status.is_success() {
        return match parse_response_json_strict(body_text, Some(status)) {
            Ok(payload) => DispatchOutcome::success(payload),
            Err(error) => DispatchOutcome::Failure {
                diagnostic: redact_sensitive(&error.to_string()),
                status: Some(status.as_u16()),
                raw: None,
            },
        };
    }

    let raw = serde_json::from_str::<Value>(body_text).ok();
    let diagnostic = raw
        .as_ref()
        .and_then(extract_error_message)
        .or_else(|| status_error_message(status.as_u16()))
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    DispatchOutcome::Failure {
        diagnostic: redact_sensitive(&diagnostic),
        status: Some(status.as_u16()),
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::Duration;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://127.0.0.1:{port}/v1/forms")
    }

    fn client_for(base_url: &str, timeout: Duration) -> FormsClient {
        FormsClient::new(ClientConfig::default().with_base_url(base_url).with_timeout(timeout)).expect("client builds")
    }

    fn header_text(headers: &HeaderMap, name: &str) -> Value {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| json!(value))
            .unwrap_or(Value::Null)
    }

    #[test]
    fn classify_success_requires_json_body() {
        let outcome = classify_response(StatusCode::OK, r#"{"formId":"abc"}"#);
        assert_eq!(outcome, DispatchOutcome::success(json!({"formId": "abc"})));

        let outcome = classify_response(StatusCode::OK, "");
        assert!(matches!(outcome, DispatchOutcome::Failure { status: Some(200), raw: None, .. }));
    }

    #[test]
    fn classify_failure_prefers_error_body_message() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let DispatchOutcome::Failure { diagnostic, status, raw } = classify_response(StatusCode::NOT_FOUND, body) else {
            panic!("expected failure");
        };
        assert_eq!(diagnostic, "Requested entity was not found.");
        assert_eq!(status, Some(404));
        assert_eq!(raw.unwrap()["error"]["status"], json!("NOT_FOUND"));
    }

    #[test]
    fn classify_failure_falls_back_to_status_hint_then_generic_line() {
        let DispatchOutcome::Failure { diagnostic, .. } = classify_response(StatusCode::UNAUTHORIZED, "") else {
            panic!("expected failure");
        };
        assert!(diagnostic.starts_with("Unauthorized (401)"), "diagnostic: {diagnostic}");

        let DispatchOutcome::Failure { diagnostic, raw, .. } = classify_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
        else {
            panic!("expected failure");
        };
        assert_eq!(diagnostic, "Request failed with status code 502");
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn dispatch_attaches_bearer_and_content_type() {
        let router = Router::new().route(
            "/v1/forms/{form_id}",
            get(|headers: HeaderMap| async move {
                Json(json!({
                    "authorization": header_text(&headers, "authorization"),
                    "contentType": header_text(&headers, "content-type"),
                }))
            }),
        );
        let base_url = spawn_server(router).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let outcome = client
            .dispatch(&ApiRequest::get("/form-1"), &Credential::new("token-123"))
            .await
            .expect("request constructed");

        assert_eq!(
            outcome,
            DispatchOutcome::success(json!({
                "authorization": "Bearer token-123",
                "contentType": "application/json",
            }))
        );
    }

    #[tokio::test]
    async fn dispatch_posts_json_body() {
        let router = Router::new().route("/v1/forms/{target}", post(|Json(body): Json<Value>| async move { Json(json!({ "echo": body })) }));
        let base_url = spawn_server(router).await;
        let client = client_for(&base_url, Duration::from_secs(5));
        let body = json!({"requests": [{"deleteItem": {"location": {"index": 1}}}]});

        let outcome = client
            .dispatch(&ApiRequest::post("/form-1:batchUpdate", body.clone()), &Credential::new("t"))
            .await
            .expect("request constructed");

        assert_eq!(outcome, DispatchOutcome::success(json!({ "echo": body })));
    }

    #[tokio::test]
    async fn dispatch_maps_remote_errors_to_failure() {
        let router = Router::new().route(
            "/v1/forms/{form_id}",
            get(|| async {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    Json(json!({"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}})),
                )
            }),
        );
        let base_url = spawn_server(router).await;
        let client = client_for(&base_url, Duration::from_secs(5));

        let outcome = client
            .dispatch(&ApiRequest::get("/form-1"), &Credential::new("t"))
            .await
            .expect("request constructed");

        let DispatchOutcome::Failure { diagnostic, status, raw } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(diagnostic, "The caller does not have permission");
        assert_eq!(status, Some(403));
        assert!(raw.is_some());
    }

    #[tokio::test]
    async fn dispatch_times_out_as_failure() {
        let router = Router::new().route(
            "/v1/forms/{form_id}",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({}))
            }),
        );
        let base_url = spawn_server(router).await;
        let client = client_for(&base_url, Duration::from_millis(200));

        let outcome = client
            .dispatch(&ApiRequest::get("/slow"), &Credential::new("t"))
            .await
            .expect("request constructed");

        let DispatchOutcome::Failure { diagnostic, status, .. } = outcome else {
            panic!("expected failure");
        };
        assert!(diagnostic.starts_with("Request timed out"), "diagnostic: {diagnostic}");
        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn dispatch_reports_unreachable_host_as_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client = client_for(&format!("http://127.0.0.1:{port}/v1/forms"), Duration::from_secs(2));

        let outcome = client
            .dispatch(&ApiRequest::get("/form-1"), &Credential::new("t"))
            .await
            .expect("request constructed");

        assert!(matches!(outcome, DispatchOutcome::Failure { status: None, .. }));
    }

    #[tokio::test]
    async fn invalid_token_bytes_are_a_construction_fault() {
        let client = client_for("http://127.0.0.1:9/v1/forms", Duration::from_secs(1));

        let error = client
            .dispatch(&ApiRequest::get("/form-1"), &Credential::new("bad\ntoken"))
            .await
            .unwrap_err();

        assert!(matches!(error, DispatchError::RequestConstruction { .. }));
    }
}
