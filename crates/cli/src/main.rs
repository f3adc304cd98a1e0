mod server;

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formgate_api::{ClientConfig, FormsClient};
use formgate_auth::{
    AuthGate, AuthUrlProvider, CredentialStore, GOOGLE_PROVIDER, GoogleOAuthProvider, OAuth2ProviderConfig, UnconfiguredProvider,
};
use formgate_engine::{FormsService, tool_catalog};
use formgate_types::{AgentId, Credential};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::server::ServerState;

#[derive(Debug, Parser)]
#[command(name = "formgate", version, about = "Run Google Forms operations on behalf of an agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tool catalog with input schemas as JSON.
    Tools,
    /// Invoke one tool and print its result as JSON.
    Call {
        /// Tool id, e.g. `get-form` or `oauth2-google`.
        tool_id: String,
        #[arg(long)]
        agent: String,
        /// Tool arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        input: String,
        /// Access token to seed the credential store with for `--agent`.
        #[arg(long, env = "FORMGATE_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
    },
    /// Print a fresh Google authorization URL for an agent.
    ///
    /// The URL can only be completed by a running `serve` process.
    AuthUrl {
        #[arg(long)]
        agent: String,
    },
    /// Serve tool calls over HTTP and receive the Google OAuth redirect.
    Serve {
        #[arg(long, env = "FORMGATE_LISTEN", default_value = "127.0.0.1:2022")]
        listen: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Tools => print_json(&serde_json::to_value(tool_catalog())?),
        Command::Call {
            tool_id,
            agent,
            input,
            access_token,
        } => {
            let agent = AgentId::new(agent);
            let arguments: Value = serde_json::from_str(&input).context("--input must be valid JSON")?;
            let service = build_service(&agent, access_token).await?;
            let result = service.invoke_tool(&tool_id, &agent, arguments).await?;
            print_json(&serde_json::to_value(result)?)
        }
        Command::AuthUrl { agent } => {
            let agent = AgentId::new(agent);
            let service = build_service(&agent, None).await?;
            let url = service.gate().authorization_url(&agent).await?;
            writeln!(io::stdout(), "{url}")?;
            Ok(())
        }
        Command::Serve { listen } => {
            let store = Arc::new(CredentialStore::new());
            let config = OAuth2ProviderConfig::google_from_env().context("serve requires Google OAuth client settings")?;
            let oauth = Arc::new(GoogleOAuthProvider::new(config, Arc::clone(&store))?);
            let service = FormsService::new(AuthGate::new(store, oauth.clone(), GOOGLE_PROVIDER), forms_client()?);
            server::serve(listen, ServerState::new(Arc::new(service), oauth)).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn build_service(agent: &AgentId, access_token: Option<String>) -> Result<FormsService> {
    let store = Arc::new(CredentialStore::new());
    if let Some(token) = access_token.filter(|token| !token.trim().is_empty()) {
        store.set(agent, Credential::new(token)).await;
        info!(agent_id = %agent, "seeded credential from environment");
    }

    let provider: Arc<dyn AuthUrlProvider> = match OAuth2ProviderConfig::google_from_env() {
        Ok(config) => Arc::new(GoogleOAuthProvider::new(config, Arc::clone(&store))?),
        Err(error) => {
            warn!(%error, "Google OAuth is not configured; authorization URLs are unavailable");
            Arc::new(UnconfiguredProvider)
        }
    };

    Ok(FormsService::new(AuthGate::new(store, provider, GOOGLE_PROVIDER), forms_client()?))
}

fn forms_client() -> Result<Arc<FormsClient>> {
    let config = ClientConfig::from_env().context("invalid Forms API configuration")?;
    Ok(Arc::new(FormsClient::new(config)?))
}

fn print_json(value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    writeln!(io::stdout(), "{rendered}")?;
    Ok(())
}
