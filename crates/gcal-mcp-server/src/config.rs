//! Server configuration from `GCAL_*` environment variables.

use std::path::PathBuf;

use gcal_mcp_providers::DEFAULT_MAX_RESULTS;
use gcal_mcp_providers::google::CredentialPaths;

use crate::error::{ServerError, ServerResult};

/// Environment variable holding the authorized-user credentials path.
pub const ENV_CREDENTIALS_PATH: &str = "GCAL_CREDENTIALS_PATH";
/// Environment variable holding the OAuth-app file path.
pub const ENV_OAUTH_PATH: &str = "GCAL_OAUTH_PATH";
/// Environment variable holding the default calendar id.
pub const ENV_DEFAULT_CALENDAR: &str = "GCAL_DEFAULT_CALENDAR";
/// Environment variable holding the default event page size.
pub const ENV_MAX_RESULTS: &str = "GCAL_MAX_RESULTS";

const DEFAULT_CREDENTIALS_PATH: &str = "~/.gcal-mcp/credentials.json";
const DEFAULT_OAUTH_PATH: &str = "~/.gcal-mcp/gcp-oauth.keys.json";
const DEFAULT_CALENDAR: &str = "primary";

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Authorized-user token file.
    pub credentials_path: PathBuf,
    /// OAuth-app file with the client identity.
    pub oauth_path: PathBuf,
    /// Calendar used when a tool call names none.
    pub default_calendar: String,
    /// Page size used when `list_events` names none.
    pub max_results: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials_path: expand_tilde(DEFAULT_CREDENTIALS_PATH),
            oauth_path: expand_tilde(DEFAULT_OAUTH_PATH),
            default_calendar: DEFAULT_CALENDAR.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset and blank values keep the default.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut settings = Self::default();

        if let Some(path) = get(ENV_CREDENTIALS_PATH) {
            settings.credentials_path = expand_tilde(&path);
        }
        if let Some(path) = get(ENV_OAUTH_PATH) {
            settings.oauth_path = expand_tilde(&path);
        }
        if let Some(calendar) = get(ENV_DEFAULT_CALENDAR) {
            settings.default_calendar = calendar;
        }
        if let Some(raw) = get(ENV_MAX_RESULTS) {
            settings.max_results = raw.parse().map_err(|_| {
                ServerError::config(format!(
                    "{} must be a positive integer, got {:?}",
                    ENV_MAX_RESULTS, raw
                ))
            })?;
            if settings.max_results == 0 {
                return Err(ServerError::config(format!(
                    "{} must be a positive integer, got 0",
                    ENV_MAX_RESULTS
                )));
            }
        }

        Ok(settings)
    }

    /// Returns the credential file locations.
    pub fn credential_paths(&self) -> CredentialPaths {
        CredentialPaths::new(&self.credentials_path, &self.oauth_path)
    }
}

/// Expands a leading `~` against the home directory.
///
/// Paths without a leading `~`, and all paths when no home directory is
/// known, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
