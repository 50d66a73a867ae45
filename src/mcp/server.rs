//! MCP Server
//!
//! Line-delimited JSON-RPC over stdio. Each connection is one
//! [`McpSession`]; stdout carries only protocol messages.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::handlers::ToolHandlers;
use super::session::McpSession;
use crate::aggregate::Aggregator;

/// MCP Server
pub struct McpServer {
    aggregator: Arc<Aggregator>,
}

impl McpServer {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self { aggregator }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve one connection until the reader is exhausted
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut session = McpSession::open(ToolHandlers::new(self.aggregator.clone()));
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            tracing::debug!("<- {}", preview(line));

            let Some(response) = session.handle_message(line).await else {
                continue;
            };
            let out = serde_json::to_string(&response)?;
            tracing::debug!("-> {}", preview(&out));

            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        session.close();
        Ok(())
    }
}

/// First 100 characters, for logs
fn preview(text: &str) -> String {
    match text.char_indices().nth(100) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
