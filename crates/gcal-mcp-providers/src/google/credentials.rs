//! Credential lifecycle: load, merge client identity, refresh, persist.
//!
//! [`CredentialManager`] builds the authenticated API client once and hands
//! out the same instance afterwards. Concurrent first calls wait on a single
//! initialization; a failed initialization leaves the cell empty so the next
//! call starts over.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarRemote, RemoteSource};

use super::client::GoogleCalendarClient;
use super::config::{CredentialPaths, DEFAULT_TIMEOUT, OAuthCredentials, scopes};
use super::oauth::OAuthClient;
use super::tokens::StoredToken;

/// Owns the cached, authenticated Google client.
pub struct CredentialManager {
    paths: CredentialPaths,
    timeout: Duration,
    client: OnceCell<Arc<GoogleCalendarClient>>,
}

impl CredentialManager {
    /// Creates a manager; nothing is read until the first client request.
    pub fn new(paths: CredentialPaths) -> Self {
        Self {
            paths,
            timeout: DEFAULT_TIMEOUT,
            client: OnceCell::new(),
        }
    }

    /// Sets the HTTP timeout used for refresh and API calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured file locations.
    pub fn paths(&self) -> &CredentialPaths {
        &self.paths
    }

    /// Returns the authenticated client, building it on first use.
    pub async fn authenticated_client(&self) -> ProviderResult<Arc<GoogleCalendarClient>> {
        self.client
            .get_or_try_init(|| self.initialize())
            .await
            .cloned()
    }

    /// Reads the token record and fills in a missing client identity.
    pub fn load_record(&self) -> ProviderResult<StoredToken> {
        let path = &self.paths.credentials;
        if !path.exists() {
            return Err(ProviderError::configuration(format!(
                "No credentials found at {}. Run 'gcal-mcp auth' first.",
                path.display()
            )));
        }

        let mut record = StoredToken::load(path)?;

        if !record.has_client_identity() && self.paths.oauth_app.exists() {
            let app = OAuthCredentials::from_file(&self.paths.oauth_app)?;
            debug!(path = %self.paths.oauth_app.display(), "merged client identity");
            record.merge_client(&app);
        }

        if record.scopes.is_empty() {
            record.scopes = scopes();
        }

        Ok(record)
    }

    async fn initialize(&self) -> ProviderResult<Arc<GoogleCalendarClient>> {
        let mut record = self.load_record()?;
        let now = Utc::now();

        if record.needs_refresh(now) {
            match record.refresh_token().map(str::to_string) {
                Some(refresh_token) => {
                    let oauth = OAuthClient::new(record.client(), self.timeout)?;
                    let response = oauth.refresh(&refresh_token, record.token_uri()).await?;
                    record.apply_access_token(response.access_token, response.expires_in, Utc::now());
                    if let Some(rotated) = response.refresh_token {
                        record.refresh_token = Some(rotated);
                    }
                    record.save(&self.paths.credentials)?;
                    info!(path = %self.paths.credentials.display(), "persisted refreshed credentials");
                }
                None => {
                    warn!("access token expired and no refresh token available; continuing");
                }
            }
        }

        let access_token = record.access_token().unwrap_or_default();
        let client = GoogleCalendarClient::new(access_token, self.timeout)?;
        debug!("built calendar client");
        Ok(Arc::new(client))
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("paths", &self.paths)
            .field("initialized", &self.client.initialized())
            .finish()
    }
}

impl RemoteSource for CredentialManager {
    fn remote(&self) -> BoxFuture<'_, ProviderResult<Arc<dyn CalendarRemote>>> {
        Box::pin(async move {
            let client: Arc<dyn CalendarRemote> = self.authenticated_client().await?;
            Ok(client)
        })
    }
}
