//! Long-running HTTP surface for `formgate serve`.
//!
//! One process owns the credential store, so the OAuth redirect and later
//! tool calls see the same credentials.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use formgate_auth::{AuthError, GOOGLE_CALLBACK_PATH, GoogleOAuthProvider};
use formgate_engine::{FormsService, InvocationError, ToolDescriptor, tool_catalog};
use formgate_types::{AgentId, NeutralResult};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{info, warn};

const SUCCESS_HTML: &str =
    "<html><body><h1>Authentication successful</h1><p>You may close this window and return to your agent.</p></body></html>";
const DENIED_HTML: &str = "<html><body><h1>Authentication cancelled</h1><p>Access was not granted.</p></body></html>";
const INVALID_HTML: &str =
    "<html><body><h1>Authentication failed</h1><p>This link is invalid or has expired. Request a new one.</p></body></html>";
const EXCHANGE_FAILED_HTML: &str =
    "<html><body><h1>Authentication failed</h1><p>Google did not accept the authorization. Please retry.</p></body></html>";

#[derive(Clone)]
pub struct ServerState {
    service: Arc<FormsService>,
    oauth: Arc<GoogleOAuthProvider>,
}

impl ServerState {
    pub fn new(service: Arc<FormsService>, oauth: Arc<GoogleOAuthProvider>) -> Self {
        Self { service, oauth }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(GOOGLE_CALLBACK_PATH, get(oauth_callback))
        .route("/tools", get(list_tools))
        .route("/tools/{tool_id}", post(call_tool))
        .with_state(state)
}

pub async fn serve(listen: SocketAddr, state: ServerState) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!(address = %listener.local_addr()?, callback = GOOGLE_CALLBACK_PATH, "formgate listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    state: Option<String>,
    code: Option<String>,
    error: Option<String>,
}

async fn oauth_callback(State(state): State<ServerState>, Query(params): Query<CallbackParams>) -> (StatusCode, Html<&'static str>) {
    if let Some(error) = params.error {
        warn!(%error, "authorization denied at consent screen");
        return (StatusCode::BAD_REQUEST, Html(DENIED_HTML));
    }
    let (Some(oauth_state), Some(code)) = (params.state, params.code) else {
        return (StatusCode::BAD_REQUEST, Html(INVALID_HTML));
    };

    match state.oauth.complete_authorization(&oauth_state, &code).await {
        Ok(_) => (StatusCode::OK, Html(SUCCESS_HTML)),
        Err(AuthError::UnknownState) => (StatusCode::BAD_REQUEST, Html(INVALID_HTML)),
        Err(error) => {
            warn!(%error, "authorization callback failed");
            (StatusCode::BAD_GATEWAY, Html(EXCHANGE_FAILED_HTML))
        }
    }
}

async fn list_tools() -> Json<Vec<ToolDescriptor>> {
    Json(tool_catalog())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCall {
    agent_id: String,
    #[serde(default)]
    arguments: Value,
}

async fn call_tool(
    State(state): State<ServerState>,
    Path(tool_id): Path<String>,
    Json(call): Json<ToolCall>,
) -> Result<Json<NeutralResult>, ToolCallError> {
    let agent = AgentId::new(call.agent_id);
    let result = state.service.invoke_tool(&tool_id, &agent, call.arguments).await?;
    info!(
        agent_id = %agent,
        tool = %tool_id,
        auth_prompt = result.presentation.is_auth_prompt(),
        alert = result.presentation.is_alert(),
        "tool call finished"
    );
    Ok(Json(result))
}

struct ToolCallError(InvocationError);

impl From<InvocationError> for ToolCallError {
    fn from(error: InvocationError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ToolCallError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InvocationError::InvalidInput { .. } | InvocationError::Translation(_) => StatusCode::BAD_REQUEST,
            InvocationError::UnknownTool { .. } => StatusCode::NOT_FOUND,
            InvocationError::Configuration(_) | InvocationError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "tool call aborted");
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::Form;
    use formgate_api::{Dispatch, DispatchError};
    use formgate_auth::{AuthGate, CredentialStore, GOOGLE_PROVIDER, OAuth2ProviderConfig};
    use formgate_types::{ApiRequest, Credential, DispatchOutcome};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use url::Url;

    #[derive(Default)]
    struct RecordingDispatcher {
        tokens: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Dispatch for RecordingDispatcher {
        async fn dispatch(&self, _request: &ApiRequest, credential: &Credential) -> Result<DispatchOutcome, DispatchError> {
            self.tokens.lock().unwrap().push(credential.access_token.clone());
            Ok(DispatchOutcome::success(json!({"formId": "form-1", "info": {"title": "Feedback"}})))
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://127.0.0.1:{port}")
    }

    async fn spawn_token_endpoint() -> String {
        let router = Router::new().route(
            "/token",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                if form.get("code").map(String::as_str) == Some("good-code") {
                    (StatusCode::OK, Json(json!({"access_token": "ya29.from-callback", "expires_in": 3599})))
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"})))
                }
            }),
        );
        format!("{}/token", spawn(router).await)
    }

    async fn spawn_formgate(dispatcher: Arc<RecordingDispatcher>) -> String {
        let store = Arc::new(CredentialStore::new());
        let config = OAuth2ProviderConfig {
            client_id: "client-123".into(),
            client_secret: "secret-456".into(),
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: spawn_token_endpoint().await,
            redirect_uri: "http://localhost:2022/oauth2/callback/google".into(),
            scopes: vec!["email".into()],
        };
        let oauth = Arc::new(GoogleOAuthProvider::new(config, Arc::clone(&store)).unwrap());
        let service = FormsService::new(AuthGate::new(store, oauth.clone(), GOOGLE_PROVIDER), dispatcher);
        spawn(router(ServerState::new(Arc::new(service), oauth))).await
    }

    async fn call(base: &str, tool: &str, body: Value) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(format!("{base}/tools/{tool}"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    fn state_from(url: &str) -> String {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn callback_completes_authorization_for_later_tool_calls() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let base = spawn_formgate(Arc::clone(&dispatcher)).await;
        let request = json!({"agentId": "agent-7", "arguments": {"formId": "form-1"}});

        let (status, prompt) = call(&base, "get-form", request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(prompt["presentation"]["type"], "authPrompt");
        let state = state_from(prompt["presentation"]["url"].as_str().unwrap());

        let callback = reqwest::get(format!("{base}/oauth2/callback/google?state={state}&code=good-code"))
            .await
            .unwrap();
        assert_eq!(callback.status().as_u16(), 200);
        assert!(callback.text().await.unwrap().contains("Authentication successful"));

        let (status, result) = call(&base, "get-form", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["summary"], "Retrieved form: Feedback");
        assert_eq!(*dispatcher.tokens.lock().unwrap(), vec!["ya29.from-callback".to_string()]);
    }

    #[tokio::test]
    async fn callback_rejects_unknown_state_and_denied_consent() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let base = spawn_formgate(Arc::clone(&dispatcher)).await;

        let unknown = reqwest::get(format!("{base}/oauth2/callback/google?state=forged&code=good-code"))
            .await
            .unwrap();
        assert_eq!(unknown.status().as_u16(), 400);

        let denied = reqwest::get(format!("{base}/oauth2/callback/google?error=access_denied"))
            .await
            .unwrap();
        assert_eq!(denied.status().as_u16(), 400);
        assert!(denied.text().await.unwrap().contains("Authentication cancelled"));

        let missing = reqwest::get(format!("{base}/oauth2/callback/google")).await.unwrap();
        assert_eq!(missing.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn failed_code_exchange_leaves_agent_unauthenticated() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let base = spawn_formgate(Arc::clone(&dispatcher)).await;
        let request = json!({"agentId": "agent-8", "arguments": {"formId": "form-1"}});

        let (_, prompt) = call(&base, "get-form", request.clone()).await;
        let state = state_from(prompt["presentation"]["url"].as_str().unwrap());
        let callback = reqwest::get(format!("{base}/oauth2/callback/google?state={state}&code=bad-code"))
            .await
            .unwrap();
        assert_eq!(callback.status().as_u16(), 502);

        let (_, again) = call(&base, "get-form", request).await;
        assert_eq!(again["presentation"]["type"], "authPrompt");
        assert!(dispatcher.tokens.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invocation_errors_map_to_status_codes() {
        let base = spawn_formgate(Arc::new(RecordingDispatcher::default())).await;

        let (status, body) = call(&base, "delete-form", json!({"agentId": "a"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown tool: delete-form");

        let (status, _) = call(&base, "get-responses", json!({"agentId": "a", "arguments": {"formId": "f", "pageSize": 0}})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let tools: Value = reqwest::get(format!("{base}/tools")).await.unwrap().json().await.unwrap();
        assert_eq!(tools.as_array().unwrap().len(), 8);
    }
}
