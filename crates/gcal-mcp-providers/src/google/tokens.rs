//! Authorized-user token record and its on-disk storage.
//!
//! The record is the JSON document written by `gcal-mcp auth` and rewritten
//! after every refresh. Keys this crate does not model are carried through
//! untouched.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

use super::config::{DEFAULT_TOKEN_URI, OAuthCredentials};

/// Tokens expiring within this margin are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// An OAuth token record in authorized-user format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Current access token.
    #[serde(default, alias = "access_token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Long-lived refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token endpoint used for refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    /// OAuth client id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredToken {
    /// Reads a token record from disk.
    pub fn load(path: &Path) -> ProviderResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to parse credentials file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })
    }

    /// Writes the record to disk atomically with owner-only permissions.
    pub fn save(&self, path: &Path) -> ProviderResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!(
                    "failed to create credentials directory: {}",
                    e
                ))
                .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            ProviderError::configuration(format!("failed to serialize credentials: {}", e))
                .with_source(e)
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!("failed to write credentials file: {}", e))
                .with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&temp_path, perms);
        }

        fs::rename(&temp_path, path).map_err(|e| {
            ProviderError::configuration(format!("failed to replace credentials file: {}", e))
                .with_source(e)
        })?;

        debug!(path = %path.display(), "saved credentials");
        Ok(())
    }

    /// Returns true if the access token is past (or about to pass) its expiry.
    ///
    /// A record without an expiry never counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry)
    }

    /// Returns true if the access token must be refreshed before use.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.access_token().is_none() || self.is_expired(now)
    }

    /// Returns the access token, if one is present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the refresh token, if one is present and non-empty.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the token endpoint, falling back to Google's.
    pub fn token_uri(&self) -> &str {
        self.token_uri
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_TOKEN_URI)
    }

    /// Returns true if the record carries a client id.
    pub fn has_client_identity(&self) -> bool {
        self.client_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Fills in the client identity from the OAuth-app file.
    pub fn merge_client(&mut self, app: &OAuthCredentials) {
        self.client_id = Some(app.client_id.clone());
        self.client_secret = Some(app.client_secret.clone());
    }

    /// Returns the client identity held by the record.
    pub fn client(&self) -> OAuthCredentials {
        OAuthCredentials::new(
            self.client_id.clone().unwrap_or_default(),
            self.client_secret.clone().unwrap_or_default(),
        )
    }

    /// Stores a freshly issued access token.
    pub fn apply_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
        now: DateTime<Utc>,
    ) {
        self.token = Some(access_token.into());
        self.expiry = expires_in_secs.map(|secs| now + Duration::seconds(secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_authorized_user_record() {
        let json = r#"{
            "token": "ya29.abc",
            "refresh_token": "1//refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "cid",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/calendar"],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2025-01-15T13:00:00.123456Z"
        }"#;

        let token: StoredToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token(), Some("ya29.abc"));
        assert_eq!(token.refresh_token(), Some("1//refresh"));
        assert!(token.has_client_identity());
        assert!(!token.needs_refresh(now()));
        assert_eq!(token.extra["universe_domain"], "googleapis.com");
    }

    #[test]
    fn access_token_alias() {
        let token: StoredToken = serde_json::from_str(r#"{"access_token": "t"}"#).unwrap();
        assert_eq!(token.access_token(), Some("t"));
    }

    #[test]
    fn expiry_rules() {
        let mut token = StoredToken {
            token: Some("t".into()),
            ..Default::default()
        };
        assert!(!token.needs_refresh(now()));

        token.expiry = Some(now() - Duration::minutes(5));
        assert!(token.is_expired(now()));

        token.expiry = Some(now() + Duration::seconds(30));
        assert!(token.is_expired(now()));

        token.expiry = Some(now() + Duration::hours(1));
        assert!(!token.needs_refresh(now()));

        token.token = Some(String::new());
        assert!(token.needs_refresh(now()));
    }

    #[test]
    fn token_uri_default() {
        assert_eq!(StoredToken::default().token_uri(), DEFAULT_TOKEN_URI);
    }

    #[test]
    fn merge_client_identity() {
        let mut token = StoredToken::default();
        assert!(!token.has_client_identity());
        token.merge_client(&OAuthCredentials::new("id", "secret"));
        assert_eq!(token.client(), OAuthCredentials::new("id", "secret"));
    }

    #[test]
    fn apply_access_token_sets_expiry() {
        let mut token = StoredToken::default();
        token.apply_access_token("new", Some(3600), now());
        assert_eq!(token.access_token(), Some("new"));
        assert_eq!(token.expiry, Some(now() + Duration::hours(1)));
    }

    #[test]
    fn save_and_load_keep_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let mut token: StoredToken =
            serde_json::from_str(r#"{"token": "a", "refresh_token": "r", "account": "me@example.com"}"#)
                .unwrap();
        token.apply_access_token("b", Some(60), now());
        token.save(&path).unwrap();

        let loaded = StoredToken::load(&path).unwrap();
        assert_eq!(loaded, token);
        assert_eq!(loaded.extra["account"], "me@example.com");
        assert!(!path.with_extension("json.tmp").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{oops").unwrap();
        let err = StoredToken::load(&path).unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
    }
}
