//! JSON-RPC dispatch for the MCP method set.
//!
//! [`McpHandler`] turns one decoded line into at most one response.
//! Notifications and blank lines produce none.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{Span, debug, info, warn};

use gcal_mcp_protocol::{
    CallToolParams, CallToolResult, InitializeResult, JSONRPC_VERSION, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ProtocolError, RpcError, decode_message,
};

use crate::tools::{CalendarTools, ToolCallError, definitions};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "gcal-mcp";

const INSTRUCTIONS: &str = "Google Calendar tools. Times are ISO 8601 / RFC 3339 strings; \
calendar_id defaults to the configured calendar when omitted.";

/// Routes MCP requests to the calendar tools.
#[derive(Debug, Clone)]
pub struct McpHandler {
    tools: CalendarTools,
}

impl McpHandler {
    /// Creates a handler over the given tool set.
    pub fn new(tools: CalendarTools) -> Self {
        Self { tools }
    }

    /// Decodes one input line and handles it.
    pub async fn handle_line(&self, line: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match decode_message(line) {
            Ok(value) => value,
            Err(ProtocolError::EmptyMessage) => return None,
            Err(e @ ProtocolError::MessageTooLarge { .. }) => {
                warn!(error = %e, "rejecting oversized request");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    RpcError::invalid_request(e.to_string()),
                ));
            }
            Err(e) => {
                debug!(error = %e, "unparsable request line");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    RpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                RpcError::invalid_request(format!("Invalid request: {}", e)),
            )),
        }
    }

    /// Handles one request; returns `None` for notifications.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, duration_ms))]
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                RpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification");
            return None;
        };

        let start = Instant::now();
        let outcome = self.dispatch(&request.method, request.params).await;
        Span::current().record("duration_ms", start.elapsed().as_millis());

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        match method {
            "initialize" => {
                let result = InitializeResult::new(SERVER_NAME, env!("CARGO_PKG_VERSION"))
                    .with_instructions(INSTRUCTIONS);
                info!(version = env!("CARGO_PKG_VERSION"), "client initialized");
                to_value(&result)
            }
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => to_value(&ListToolsResult {
                tools: definitions(),
            }),
            "tools/call" => {
                let result = self.call_tool(params).await?;
                to_value(&result)
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<CallToolResult, RpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| RpcError::invalid_params("Missing params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
            })?;

        let arguments = params.arguments.unwrap_or_default();
        match self.tools.call(&params.name, arguments).await {
            Ok(text) => Ok(CallToolResult::text(text)),
            Err(ToolCallError::UnknownTool(name)) => {
                Err(RpcError::invalid_params(format!("Unknown tool: {}", name)))
            }
            Err(ToolCallError::Failed(error)) => {
                warn!(tool = %params.name, code = error.code().as_str(), error = %error, "tool failed");
                Ok(CallToolResult::error(error.to_string()))
            }
        }
    }
}

fn to_value<T: Serialize>(result: &T) -> Result<Value, RpcError> {
    serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
}
