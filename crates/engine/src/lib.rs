//! # Formgate Engine
//!
//! Turns agent tool calls into authenticated Google Forms API calls and
//! their outcomes into presentation-neutral results.
//!
//! ## Flow
//!
//! For each invocation [`FormsService`] runs:
//!
//! 1. input validation ([`validate`])
//! 2. the auth gate, which may short-circuit with an authentication prompt
//! 3. request translation ([`translate`])
//! 4. one dispatch through the injected [`formgate_api::Dispatch`]
//! 5. result projection ([`project`])
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use formgate_api::{ClientConfig, FormsClient};
//! use formgate_auth::{AuthGate, CredentialStore, UnconfiguredProvider};
//! use formgate_engine::FormsService;
//!
//! let store = Arc::new(CredentialStore::new());
//! let gate = AuthGate::new(store, Arc::new(UnconfiguredProvider), "google");
//! let service = FormsService::new(gate, Arc::new(FormsClient::new(ClientConfig::default())?));
//! let result = service
//!     .invoke_tool("get-form", &"agent-1".into(), serde_json::json!({"formId": "1FAIpQL"}))
//!     .await?;
//! ```

pub mod error;
pub mod project;
pub mod service;
pub mod tools;
pub mod translate;
pub mod validate;

pub use error::{InvocationError, TranslationError};
pub use project::{authentication_required, project};
pub use service::FormsService;
pub use tools::{OAUTH_TOOL_ID, ToolDescriptor, parse_arguments, tool_catalog};
pub use translate::translate;
pub use validate::validate;
