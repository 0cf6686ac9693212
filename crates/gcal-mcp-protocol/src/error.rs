//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while framing or parsing messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Message is not valid JSON or does not match the expected shape.
    #[error("invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blank line where a message was expected.
    #[error("empty message")]
    EmptyMessage,
}
