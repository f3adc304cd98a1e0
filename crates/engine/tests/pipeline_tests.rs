use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use formgate_api::{ClientConfig, FormsClient};
use formgate_auth::{AuthGate, CredentialStore, UnconfiguredProvider};
use formgate_engine::FormsService;
use formgate_types::{AgentId, Credential, Presentation};
use serde_json::{Value, json};

type Captured = Arc<Mutex<Vec<(String, Value)>>>;

async fn spawn_forms_api(captured: Captured) -> String {
    let router = Router::new()
        .route(
            "/v1/forms/{form_id}",
            post(
                |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let authorization = headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    captured.lock().unwrap().push((authorization, body));
                    Json(json!({"replies": [{}], "writeControl": {"requiredRevisionId": "0000002a"}}))
                },
            ),
        )
        .route(
            "/v1/forms/{form_id}/responses",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}})),
                )
            }),
        )
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock forms api");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://127.0.0.1:{port}/v1/forms")
}

async fn service_against(base_url: &str, agent: &AgentId) -> FormsService {
    let store = Arc::new(CredentialStore::new());
    store.set(agent, Credential::new("ya29.integration")).await;
    let client = FormsClient::new(
        ClientConfig::default()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5)),
    )
    .expect("client builds");
    FormsService::new(AuthGate::new(store, Arc::new(UnconfiguredProvider), "google"), Arc::new(client))
}

#[tokio::test]
async fn move_item_round_trips_through_the_api() {
    let captured = Captured::default();
    let base_url = spawn_forms_api(Arc::clone(&captured)).await;
    let agent = AgentId::from("agent-int");
    let service = service_against(&base_url, &agent).await;

    let result = service
        .invoke_tool(
            "move-form-item",
            &agent,
            json!({"formId": "form-1", "originalLocation": {"index": 2}, "newLocation": {"index": 0}}),
        )
        .await
        .expect("invocation completes");

    assert_eq!(result.summary, "Form item moved successfully");
    assert_eq!(
        result.data,
        Some(json!({"replies": [{}], "writeControl": {"requiredRevisionId": "0000002a"}}))
    );

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].0, "Bearer ya29.integration");
    assert_eq!(
        captured[0].1,
        json!({"requests": [{"moveItem": {"originalLocation": {"index": 2}, "newLocation": {"index": 0}}}]})
    );
}

#[tokio::test]
async fn remote_not_found_is_an_alert_not_an_error() {
    let base_url = spawn_forms_api(Captured::default()).await;
    let agent = AgentId::from("agent-int");
    let service = service_against(&base_url, &agent).await;

    let result = service
        .invoke_tool("get-responses", &agent, json!({"formId": "missing", "pageToken": "abc"}))
        .await
        .expect("remote failures are not errors");

    assert_eq!(result.summary, "Failed to get form responses");
    assert!(result.data.is_none());
    match result.presentation {
        Presentation::Alert(alert) => assert_eq!(alert.message, "Failed to get responses: Requested entity was not found."),
        other => panic!("expected alert, got {other:?}"),
    }
}
