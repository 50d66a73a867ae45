//! Company Intel MCP Server Binary
//!
//! Exposes the company lookups as MCP tools over stdio.
//!
//! ## Usage
//!
//! ```bash
//! ./target/debug/company_intel_mcp
//! ```
//!
//! Logs go to stderr; stdout carries only JSON-RPC messages.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use company_intel::mcp::McpServer;
use company_intel::{Aggregator, IntelConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "company_intel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = IntelConfig::from_env()?;
    let aggregator = Arc::new(Aggregator::from_config(&config)?);

    tracing::info!("MCP server started, waiting for messages...");
    McpServer::new(aggregator).run().await?;
    tracing::info!("MCP server shutting down");
    Ok(())
}
