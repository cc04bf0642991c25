mod args;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arlmcp_core::client::{ArlApi, ArlClient};
use arlmcp_core::config::ArlConfig;
use arlmcp_core::mcp::tools::{register_all, ToolContext};
use arlmcp_core::mcp::{serve, McpServer};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol; logs go to stderr.
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ArlConfig::load(args.config.as_deref())
        .context("failed to load ARL configuration")?;
    if let Some(url) = args.url {
        config.base_url = url.trim_end_matches('/').to_string();
    }

    info!(url = %config.base_url, "connecting to ARL backend");

    let client = ArlClient::new(&config).context("failed to build ARL client")?;
    let context = ToolContext::new(Arc::new(client) as Arc<dyn ArlApi>);

    let mut server = McpServer::new("arlmcp", env!("CARGO_PKG_VERSION"));
    register_all(&mut server, &context);
    info!(tools = server.tool_count(), "serving MCP on stdio");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    serve(&server, &mut reader, &mut writer)
        .await
        .context("MCP session failed")?;

    info!("stdin closed, shutting down");
    Ok(())
}
