//! Server error types.

use std::io;
use thiserror::Error;

use gcal_mcp_providers::ProviderError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server or prevent it from starting.
///
/// Failures inside a single tool call never surface here; they are
/// reported back to the caller as error results.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error on stdin/stdout.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Protocol error (framing, encoding).
    #[error("Protocol error: {0}")]
    Protocol(#[from] gcal_mcp_protocol::ProtocolError),

    /// Invalid configuration value.
    #[error("configuration_error: {message}")]
    Config { message: String },

    /// Provider failure outside a tool call.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The response writer stopped before the reader finished.
    #[error("response writer stopped unexpectedly")]
    WriterStopped,
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
