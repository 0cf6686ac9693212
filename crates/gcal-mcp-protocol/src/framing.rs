//! Newline-delimited message framing for stdio.
//!
//! Each message is one line of compact JSON:
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"ping"}\n
//! ```
//!
//! Compact JSON never contains a raw newline, so the line break is an
//! unambiguous delimiter.

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Encodes a message as one JSON line, terminator included.
///
/// # Example
///
/// ```rust
/// use gcal_mcp_protocol::{encode_message, JsonRpcResponse};
///
/// let bytes = encode_message(&JsonRpcResponse::success(1.into(), serde_json::json!({}))).unwrap();
/// assert_eq!(bytes.last(), Some(&b'\n'));
/// ```
pub fn encode_message<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    let mut json = serde_json::to_vec(message)?;

    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: json.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    json.push(b'\n');
    Ok(json)
}

/// Decodes one line into a message.
///
/// Trailing `\r\n` and surrounding whitespace are ignored.
pub fn decode_message<T: DeserializeOwned>(line: &[u8]) -> ProtocolResult<T> {
    if line.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: line.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let line = line.trim_ascii();
    if line.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }

    Ok(serde_json::from_slice(line)?)
}
