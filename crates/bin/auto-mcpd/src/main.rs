//! Daemon entry point for the Admin Auto MCP server.
//!
//! Loads configuration from flags and the environment, builds the REST client
//! and serves the MCP protocol over stdio or streamable HTTP. Logs go to
//! stderr so they never mix with the stdio transport.

mod config;

use auto_core::api::{HttpTransport, HttpTransportConfig};
use auto_core::AutoApiClient;
use auto_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AutoConfig, Transport};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(filter: &str) -> Result<(), BoxError> {
    let filter = EnvFilter::try_new(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AutoConfig::from_args()?;
    init_tracing(&config.log_filter)?;

    let transport = HttpTransport::new(
        HttpTransportConfig::new(config.instance_url(), &config.username, &config.password)
            .with_timeout(config.request_timeout),
    )?;
    info!(
        backend = transport.api_url(),
        transport = ?config.transport,
        "starting Admin Auto MCP server"
    );
    let api = AutoApiClient::new(transport);

    match config.transport {
        Transport::Stdio => serve_stdio(api).await,
        Transport::Http => {
            serve_streamable_http(api, McpHttpServerConfig::new(config.http_addr)).await
        }
    }
}
