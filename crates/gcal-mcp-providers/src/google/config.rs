//! Google OAuth application settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth scopes requested for calendar access.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

/// Google's token endpoint, used when a token record names none.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Default HTTP timeout for provider and token requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns [`SCOPES`] as owned strings.
pub fn scopes() -> Vec<String> {
    SCOPES.iter().map(|s| s.to_string()).collect()
}

/// OAuth 2.0 client identity registered in Google Cloud Console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

/// Shape of the OAuth-app JSON file downloaded from the console.
#[derive(Debug, Deserialize)]
struct AppFile {
    installed: Option<AppSection>,
    web: Option<AppSection>,
}

#[derive(Debug, Default, Deserialize)]
struct AppSection {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads the OAuth-app file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read OAuth app file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses an OAuth-app document.
    ///
    /// The `installed` section is preferred over `web`. Missing keys inside
    /// the chosen section become empty strings; a document with neither
    /// section yields empty credentials.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: AppFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse OAuth app file: {}", e))
                .with_source(e)
        })?;

        let section = file.installed.or(file.web).unwrap_or_default();
        Ok(Self::new(section.client_id, section.client_secret))
    }

    /// Returns true if no client id is present.
    pub fn is_empty(&self) -> bool {
        self.client_id.is_empty()
    }
}

/// File locations used by the credential lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPaths {
    /// Authorized-user token record, written by `auth` and after refresh.
    pub credentials: PathBuf,
    /// OAuth-app file holding the client identity.
    pub oauth_app: PathBuf,
}

impl CredentialPaths {
    /// Creates a new set of paths.
    pub fn new(credentials: impl Into<PathBuf>, oauth_app: impl Into<PathBuf>) -> Self {
        Self {
            credentials: credentials.into(),
            oauth_app: oauth_app.into(),
        }
    }
}
