//! Error types for calendar operations.
//!
//! Every failure surfaced to a tool caller carries one of five codes so the
//! caller can tell "fix your setup" apart from "the remote end said no".

use std::fmt;
use thiserror::Error;

/// The category of a calendar error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Credentials or OAuth-app file missing or unreadable, bad environment value.
    ConfigurationError,
    /// Token refresh failed or the provider rejected the credential.
    AuthenticationError,
    /// The provider has no such calendar or event.
    NotFound,
    /// Network failure, quota, 5xx or an unparsable provider response.
    RemoteServiceError,
    /// Malformed tool arguments or a request the provider refused as invalid.
    ValidationError,
}

impl ProviderErrorCode {
    /// Returns the wire name of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::AuthenticationError => "authentication_error",
            Self::NotFound => "not_found",
            Self::RemoteServiceError => "remote_service_error",
            Self::ValidationError => "validation_error",
        }
    }

    /// Classifies an HTTP status returned by the provider.
    ///
    /// 400 is a validation problem, 401 an authentication one, 404 and 410
    /// mean the resource is gone. Anything else (403 quota, 429, 5xx) is
    /// reported as a remote service failure.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::ValidationError,
            401 => Self::AuthenticationError,
            404 | 410 => Self::NotFound,
            _ => Self::RemoteServiceError,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to the calendar provider or
/// preparing a request for it.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationError, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a remote service error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RemoteServiceError, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ValidationError, message)
    }

    /// Builds an error from a non-success provider response.
    ///
    /// When the body follows the `{"error": {"message": ...}}` shape the
    /// provider message is used, otherwise the raw body text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        let code = ProviderErrorCode::from_status(status);
        let message = if code == ProviderErrorCode::AuthenticationError {
            format!("provider rejected credentials ({status}): {detail}; run 'gcal-mcp auth'")
        } else {
            format!("provider returned {status}: {detail}")
        };
        Self::new(code, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            ProviderErrorCode::from_status(400),
            ProviderErrorCode::ValidationError
        );
        assert_eq!(
            ProviderErrorCode::from_status(401),
            ProviderErrorCode::AuthenticationError
        );
        assert_eq!(ProviderErrorCode::from_status(404), ProviderErrorCode::NotFound);
        assert_eq!(ProviderErrorCode::from_status(410), ProviderErrorCode::NotFound);
        for status in [403, 429, 500, 503] {
            assert_eq!(
                ProviderErrorCode::from_status(status),
                ProviderErrorCode::RemoteServiceError
            );
        }
    }

    #[test]
    fn code_names() {
        assert_eq!(
            ProviderErrorCode::ConfigurationError.as_str(),
            "configuration_error"
        );
        assert_eq!(
            ProviderErrorCode::RemoteServiceError.as_str(),
            "remote_service_error"
        );
    }

    #[test]
    fn display_includes_code() {
        let err = ProviderError::not_found("event evt_1 not found");
        assert_eq!(err.to_string(), "not_found: event evt_1 not found");
    }

    #[test]
    fn response_body_message_is_folded_in() {
        let body = r#"{"error": {"code": 404, "message": "Not Found"}}"#;
        let err = ProviderError::from_response(404, body);
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
        assert_eq!(err.message(), "provider returned 404: Not Found");
    }

    #[test]
    fn response_plain_body() {
        let err = ProviderError::from_response(502, "bad gateway\n");
        assert_eq!(err.code(), ProviderErrorCode::RemoteServiceError);
        assert_eq!(err.message(), "provider returned 502: bad gateway");
    }

    #[test]
    fn unauthorized_mentions_remedy() {
        let err = ProviderError::from_response(401, "{}");
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationError);
        assert!(err.message().contains("gcal-mcp auth"));
    }

    #[test]
    fn with_source_is_exposed() {
        use std::error::Error;
        let io_err = std::io::Error::other("disk full");
        let err = ProviderError::configuration("failed to write").with_source(io_err);
        assert!(err.source().is_some());
    }
}
