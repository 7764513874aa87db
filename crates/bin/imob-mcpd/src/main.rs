//! Daemon entry point for the imob MCP server.
//!
//! Loads configuration from the environment, announces the listening address
//! on stdout and serves health probes immediately; the MCP runtime is built on
//! the first tool-call request.

mod config;

use imob_mcp::server::serve_streamable_http;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::ImobConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ImobConfig::from_args()?;
    println!("MCP starting {} (health ready)", config.addr);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !config.backend.is_configured() {
        warn!("BACKEND_API_URL or BACKEND_INTERNAL_KEY not set; tools answer in degraded mode");
    }

    serve_streamable_http(config.server_config()).await
}
