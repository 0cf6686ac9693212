//! Client error types.

use thiserror::Error;

use gcal_mcp_providers::ProviderError;
use gcal_mcp_server::ServerError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors reported by the `gcal-mcp` binary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Provider or credential failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Server failed to start or stopped with an error.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// IO error on the terminal.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
