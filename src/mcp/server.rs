//! MCP JSON-RPC protocol handler over stdio.
//!
//! Reads JSON-RPC requests from stdin, routes tool calls through the
//! dispatcher, and sends JSON-RPC responses to stdout. Implements the MCP
//! methods `initialize`, `notifications/initialized`, `ping`, `tools/list`
//! and `tools/call`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::info;

use super::tools;
use super::McpToolResult;
use crate::dispatcher::Dispatcher;
use crate::transport::LineChannel;

const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "chroma-mcp";

// ---------------------------------------------------------------------------
// JSON-RPC message types
// ---------------------------------------------------------------------------

/// Incoming JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MCP Server
// ---------------------------------------------------------------------------

/// Per-process server state.
pub struct McpServer {
    dispatcher: Dispatcher,
    /// Suggested collection name, surfaced in the `initialize` instructions.
    default_collection: String,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, default_collection: impl Into<String>) -> Self {
        Self {
            dispatcher,
            default_collection: default_collection.into(),
        }
    }

    /// Run on the process's stdin/stdout until stdin closes.
    pub async fn run_stdio(&self) -> std::io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        self.run(reader, tokio::io::stdout()).await?;
        Ok(())
    }

    /// Serve JSON-RPC messages from `reader` line by line, one request at a
    /// time. Diagnostic logs go to stderr; `writer` carries protocol only.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> std::io::Result<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut channel = LineChannel::new(reader, writer);
        info!("Chroma MCP server running");

        while let Some(line) = channel.next_line().await? {
            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    let resp = JsonRpcResponse::error(
                        Value::Null,
                        -32700, // Parse error
                        format!("Invalid JSON: {}", e),
                    );
                    channel.send(&resp).await?;
                    continue;
                }
            };

            if request.jsonrpc != "2.0" {
                if let Some(id) = request.id {
                    let resp = JsonRpcResponse::error(id, -32600, "Invalid JSON-RPC version");
                    channel.send(&resp).await?;
                }
                continue;
            }

            let response = self.handle_request(&request).await;

            // Notifications (no id) never get a response.
            if request.id.is_none() {
                continue;
            }
            if let Some(resp) = response {
                channel.send(&resp).await?;
            }
        }

        info!("MCP server stdin closed, shutting down");
        Ok(channel.into_writer())
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(id)),
            "initialized" | "notifications/initialized" => {
                info!("[MCP] Client sent 'initialized' notification");
                None
            }
            "notifications/cancelled" => {
                info!("[MCP] Request cancelled: {:?}", request.params);
                None
            }
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => Some(handle_tools_list(id)),
            "tools/call" => Some(self.handle_tools_call(id, &request.params).await),
            _ => Some(JsonRpcResponse::error(
                id,
                -32601, // Method not found
                format!("Unknown method: {}", request.method),
            )),
        }
    }

    /// Handle `initialize` -- return server capabilities.
    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                },
                "instructions": format!(
                    "Chroma collection tools. Default collection: {}",
                    self.default_collection
                )
            }),
        )
    }

    /// Handle `tools/call` -- dispatch and render the envelope as text.
    async fn handle_tools_call(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let tool_name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if tool_name.is_empty() {
            return JsonRpcResponse::error(id, -32602, "Missing tool name in params");
        }
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let response = self.dispatcher.dispatch(tool_name, &args).await;
        let result = McpToolResult::from(&response);

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, -32603, format!("Failed to encode result: {}", e)),
        }
    }
}

/// Handle `tools/list` -- return the static tool catalogue.
fn handle_tools_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "tools": tools::list_tools() }))
}
