//! MCP Session
//!
//! One client connection with an explicit lifecycle: opened when the
//! transport connects, closed when it ends. Nothing about the connection is
//! held outside this object.

use serde_json::Value;

use super::handlers::ToolHandlers;
use super::protocol::*;
use super::tools::get_tools;

/// Lifecycle of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport connected, `initialize` not yet seen
    Open,
    Initialized,
    Closed,
}

pub struct McpSession {
    handlers: ToolHandlers,
    state: SessionState,
    handled: u64,
}

impl McpSession {
    pub fn open(handlers: ToolHandlers) -> Self {
        tracing::info!("MCP session opened");
        Self {
            handlers,
            state: SessionState::Open,
            handled: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Close the session; later messages are rejected. Returns the number of
    /// messages handled.
    pub fn close(&mut self) -> u64 {
        if self.state != SessionState::Closed {
            tracing::info!("MCP session closed after {} messages", self.handled);
            self.state = SessionState::Closed;
        }
        self.handled
    }

    /// Handle a single JSON-RPC message. `None` for notifications.
    pub async fn handle_message(&mut self, msg: &str) -> Option<JsonRpcResponse> {
        let req: JsonRpcRequest = match serde_json::from_str(msg) {
            Ok(r) => r,
            Err(e) => return Some(JsonRpcResponse::error(None, PARSE_ERROR, e.to_string())),
        };

        if self.state == SessionState::Closed {
            return Some(JsonRpcResponse::error(
                req.id,
                INVALID_REQUEST,
                "Session is closed",
            ));
        }
        self.handled += 1;

        if req.is_notification() {
            if req.method == "notifications/initialized" {
                tracing::debug!("Client finished initialization");
            }
            return None;
        }

        let id = req.id.clone();
        let response = match req.method.as_str() {
            "initialize" => {
                self.state = SessionState::Initialized;
                JsonRpcResponse::from_serializable(
                    id,
                    InitializeResult {
                        protocol_version: PROTOCOL_VERSION.into(),
                        capabilities: ServerCapabilities {
                            tools: ToolsCapability {
                                list_changed: false,
                            },
                        },
                        server_info: ServerInfo {
                            name: "company-intel-mcp".into(),
                            version: env!("CARGO_PKG_VERSION").into(),
                        },
                    },
                )
            }

            "ping" => JsonRpcResponse::success(id, Value::Object(Default::default())),

            "tools/list" => JsonRpcResponse::from_serializable(id, ToolsListResult { tools: get_tools() }),

            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => return Some(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())),
                };

                tracing::info!("Calling tool: {}", params.name);
                let result = self.handlers.handle(&params.name, params.arguments).await;
                JsonRpcResponse::from_serializable(id, result)
            }

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            ),
        };

        Some(response)
    }
}
