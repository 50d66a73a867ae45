//! MCP (Model Context Protocol) adapter
//!
//! Exposes the company lookups as tools over JSON-RPC 2.0 on stdio, for agent
//! hosts that call the pipeline as a tool.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;

pub use server::McpServer;
pub use session::{McpSession, SessionState};
