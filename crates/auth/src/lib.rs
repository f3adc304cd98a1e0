//! Credential lifecycle for Formgate.
//!
//! - [`CredentialStore`]: process-wide, injectable map from agent to OAuth credential
//! - [`AuthGate`]: decides per invocation whether dispatch may proceed
//! - [`GoogleOAuthProvider`]: produces authorization URLs and, on callback,
//!   exchanges the code and writes the resulting credential into the store

pub mod error;
pub mod gate;
pub mod oauth;
pub mod store;

pub use error::AuthError;
pub use gate::{AuthDecision, AuthGate, AuthUrlProvider, UnconfiguredProvider};
pub use oauth::{GOOGLE_CALLBACK_PATH, GOOGLE_PROVIDER, GoogleOAuthProvider, OAuth2ProviderConfig};
pub use store::CredentialStore;
