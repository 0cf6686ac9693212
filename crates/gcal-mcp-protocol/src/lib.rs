//! Wire types and framing for the tool server.
//!
//! The server speaks JSON-RPC 2.0 over stdio using the Model Context
//! Protocol method set: `initialize`, `ping`, `tools/list` and `tools/call`.
//!
//! # Framing
//!
//! One compact JSON document per line, see [`encode_message`] and
//! [`decode_message`].
//!
//! # Example
//!
//! ```rust
//! use gcal_mcp_protocol::{JsonRpcRequest, decode_message, encode_message};
//!
//! let request = JsonRpcRequest::new(1, "tools/list", None);
//! let bytes = encode_message(&request).unwrap();
//! let decoded: JsonRpcRequest = decode_message(&bytes).unwrap();
//! assert_eq!(decoded.method, "tools/list");
//! ```

mod error;
mod framing;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{decode_message, encode_message};
pub use types::{
    CallToolParams, CallToolResult, Content, Implementation, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, RpcError, ServerCapabilities, ToolAnnotations,
    ToolDefinition, ToolsCapability,
};

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP revision implemented by the server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Maximum size of one framed message (8 MiB).
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;
