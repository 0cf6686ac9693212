//! Google Calendar backend.
//!
//! - [`GoogleCalendarClient`]: REST implementation of
//!   [`CalendarRemote`](crate::CalendarRemote) against Calendar API v3
//! - [`CredentialManager`]: loads, refreshes and persists the authorized-user
//!   token record, then builds the client once
//! - [`OAuthClient`]: the interactive authorization grant used by
//!   `gcal-mcp auth`
//!
//! # Authentication Flow
//!
//! 1. The user registers an OAuth client and saves its JSON as the OAuth-app file
//! 2. `gcal-mcp auth` runs the PKCE consent flow and writes the credentials file
//! 3. On first tool call the manager reads that file, refreshing the access
//!    token when it has expired, and rewrites it
//! 4. Every later call reuses the same client

mod client;
mod config;
mod credentials;
mod oauth;
mod tokens;

pub use client::GoogleCalendarClient;
pub use config::{
    CredentialPaths, DEFAULT_TIMEOUT, DEFAULT_TOKEN_URI, OAuthCredentials, SCOPES, scopes,
};
pub use credentials::CredentialManager;
pub use oauth::{AuthorizationCallback, LOOPBACK_PORT_RANGE, OAuthClient, PkceFlow, TokenResponse};
pub use tokens::StoredToken;
