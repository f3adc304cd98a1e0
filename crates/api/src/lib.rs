//! Google Forms API client utilities.
//!
//! This crate provides the HTTP side of Formgate:
//!
//! - Constructing an HTTP client with a bounded timeout and sensible defaults
//! - Reading `FORMS_API_BASE` / `FORMGATE_HTTP_TIMEOUT_SECS` and validating the base URL
//! - Dispatching one authenticated call per operation and classifying the outcome
//!
//! The primary entry point is [`FormsClient`]. Create an instance via
//! [`FormsClient::new`] and hand it to the engine as a [`Dispatch`]
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use formgate_api::{ClientConfig, Dispatch, FormsClient};
//! use formgate_types::{ApiRequest, Credential};
//!
//! async fn fetch() -> anyhow::Result<()> {
//!     let client = FormsClient::new(ClientConfig::from_env()?)?;
//!     let outcome = client
//!         .dispatch(&ApiRequest::get("/1FAIpQLSf"), &Credential::new("ya29..."))
//!         .await?;
//!     println!("success: {}", outcome.is_success());
//!     Ok(())
//! }
//! ```

mod dispatch;

pub use dispatch::{Dispatch, DispatchError};

use std::env;
use std::time::Duration;

use reqwest::{Client, header};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Root of the Forms v1 collection.
pub const DEFAULT_FORMS_API_BASE: &str = "https://forms.googleapis.com/v1/forms";
/// Environment variable overriding [`DEFAULT_FORMS_API_BASE`].
pub const FORMS_API_BASE_ENV: &str = "FORMS_API_BASE";
/// Environment variable overriding the dispatch timeout, in whole seconds.
pub const HTTP_TIMEOUT_ENV: &str = "FORMGATE_HTTP_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Allowed hostnames or base domains for non-local configurations of
/// `FORMS_API_BASE`. Subdomains of these domains are also allowed.
const ALLOWED_API_DOMAINS: &[&str] = &["googleapis.com"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("Invalid FORMS_API_BASE URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("FORMS_API_BASE must use https for non-localhost hosts; got '{scheme}://'")]
    InsecureScheme { scheme: String },

    #[error("FORMS_API_BASE host '{host}' is not allowed; must be googleapis.com or a subdomain, or localhost")]
    DisallowedHost { host: String },

    #[error("Invalid FORMGATE_HTTP_TIMEOUT_SECS value '{value}': expected a positive number of seconds")]
    InvalidTimeout { value: String },

    #[error("Could not build the HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Connection settings for the Forms API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound for one outbound call, including reading the body.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FORMS_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the process environment.
    ///
    /// The base URL is taken from `FORMS_API_BASE` (if set) or falls back to
    /// the public Forms API. The timeout is taken from
    /// `FORMGATE_HTTP_TIMEOUT_SECS` and defaults to 30 seconds.
    pub fn from_env() -> Result<Self, ClientConfigError> {
        let base_url = env::var(FORMS_API_BASE_ENV).unwrap_or_else(|_| DEFAULT_FORMS_API_BASE.into());
        let timeout = match env::var(HTTP_TIMEOUT_ENV) {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_TIMEOUT,
        };
        validate_base_url(&base_url)?;
        Ok(Self { base_url, timeout })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ClientConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ClientConfigError::InvalidTimeout { value: raw.to_string() }),
    }
}

/// Thin wrapper around a configured `reqwest::Client` for Forms API access.
///
/// The client carries no credentials of its own; the bearer token is attached
/// per call by [`Dispatch::dispatch`].
#[derive(Debug, Clone)]
pub struct FormsClient {
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl FormsClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientConfigError> {
        validate_base_url(&config.base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .user_agent(format!("formgate/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS))
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            http,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build an absolute URL for an API-relative path such as `/{formId}:batchUpdate`.
    pub fn url_for(&self, path: &str) -> String {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "resolved request url");
        url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be `googleapis.com`
///   or a subdomain thereof
pub fn validate_base_url(base: &str) -> Result<(), ClientConfigError> {
    let parsed_base_url = Url::parse(base).map_err(|e| ClientConfigError::InvalidBaseUrl {
        value: base.to_string(),
        reason: e.to_string(),
    })?;

    let host_name = parsed_base_url.host_str().ok_or_else(|| ClientConfigError::InvalidBaseUrl {
        value: base.to_string(),
        reason: "missing host".to_string(),
    })?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(ClientConfigError::InsecureScheme {
            scheme: parsed_base_url.scheme().to_string(),
        });
    }

    let is_allowed_domain = ALLOWED_API_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(ClientConfigError::DisallowedHost {
            host: host_name.to_string(),
        });
    }

    Ok(())
}
