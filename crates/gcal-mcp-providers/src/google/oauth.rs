//! OAuth 2.0 authorization code flow with PKCE, plus token refresh.
//!
//! Two ways to obtain the authorization code:
//!
//! - loopback: bind `127.0.0.1` on a free port, open the browser, and catch
//!   the redirect ourselves;
//! - manual: the caller supplies a redirect URI it controls, the user pastes
//!   the redirected URL (or just the code) back in.
//!
//! Both end with a code exchange producing a [`StoredToken`].

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::{DEFAULT_TOKEN_URI, OAuthCredentials};
use super::tokens::StoredToken;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// PKCE verifier length in bytes, before encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long the loopback listener waits for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Ports tried for the loopback listener.
pub const LOOPBACK_PORT_RANGE: (u16, u16) = (8080, 8090);

/// Response from the token endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenResponse {
    /// Newly issued access token.
    pub access_token: String,
    /// Refresh token, only on the first grant with `prompt=consent`.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated scopes actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

/// OAuth client for Google's authorization and token endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
    token_url: String,
}

impl OAuthClient {
    /// Creates a new OAuth client with the given credentials.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            http_client,
            token_url: DEFAULT_TOKEN_URI.to_string(),
        })
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Runs the loopback flow and returns the granted token record.
    pub async fn authorize_loopback(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
    ) -> ProviderResult<StoredToken> {
        let pkce = PkceFlow::new();

        let (listener, port) = bind_loopback_server(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, scopes);

        info!("starting OAuth flow, opening browser");
        debug!(url = %auth_url, "authorization URL");

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nOpen this URL in your browser:\n\n{}\n", auth_url);
        }

        let callback = tokio::task::spawn_blocking(move || wait_for_callback(listener))
            .await
            .map_err(|e| {
                ProviderError::authentication(format!("callback listener failed: {}", e))
            })??;

        if callback.state.as_deref() != Some(pkce.state.as_str()) {
            return Err(ProviderError::authentication(
                "OAuth state mismatch, authorization response rejected",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&callback.code, &pkce.verifier, &redirect_uri, scopes)
            .await
    }

    /// Refreshes an access token.
    ///
    /// Any failure, including an unreachable endpoint, is reported as an
    /// authentication error since the stored credential cannot be used.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        token_uri: &str,
    ) -> ProviderResult<TokenResponse> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.post_token_request(token_uri, &params, "token refresh").await?;
        info!("refreshed access token");
        Ok(response)
    }

    /// Exchanges an authorization code for a full token record.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<StoredToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .post_token_request(&self.token_url, &params, "token exchange")
            .await?;
        info!("obtained tokens");
        Ok(self.token_record(response, scopes))
    }

    /// Builds the record persisted after a successful grant.
    pub fn token_record(&self, response: TokenResponse, scopes: &[String]) -> StoredToken {
        let granted = response
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| scopes.to_vec());

        let mut token = StoredToken {
            refresh_token: response.refresh_token,
            token_uri: Some(self.token_url.clone()),
            scopes: granted,
            ..Default::default()
        };
        token.merge_client(&self.credentials);
        token.apply_access_token(response.access_token, response.expires_in, Utc::now());
        token
    }

    async fn post_token_request(
        &self,
        url: &str,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::authentication(format!("{} request failed: {}", what, e))
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::authentication(format!("failed to read {} response: {}", what, e))
                .with_source(e)
        })?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}; run 'gcal-mcp auth' to re-authorize",
                what, status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::authentication(format!("invalid {} response: {}", what, e))
                .with_source(e)
        })
    }
}

/// Code and state extracted from an authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    /// Authorization code.
    pub code: String,
    /// Echoed `state`, if present.
    pub state: Option<String>,
}

impl AuthorizationCallback {
    /// Parses user input from the manual flow.
    ///
    /// Accepts either the full redirected URL or the bare code.
    pub fn parse_input(input: &str) -> ProviderResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ProviderError::validation("no authorization code provided"));
        }

        match Url::parse(input) {
            Ok(url) => Self::from_url(&url),
            Err(_) => Ok(Self {
                code: input.to_string(),
                state: None,
            }),
        }
    }

    /// Extracts the code from a redirect URL's query string.
    pub fn from_url(url: &Url) -> ProviderResult<Self> {
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => {
                    return Err(ProviderError::authentication(format!(
                        "authorization denied: {}",
                        value
                    )));
                }
                _ => {}
            }
        }

        code.filter(|c| !c.is_empty())
            .map(|code| Self { code, state })
            .ok_or_else(|| ProviderError::authentication("missing authorization code in redirect"))
    }
}

/// Tries to bind a TCP listener on a free port in the given range.
fn bind_loopback_server(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!(port, "bound loopback server");
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Blocks until the browser hits the callback path or the timeout expires.
fn wait_for_callback(listener: TcpListener) -> ProviderResult<AuthorizationCallback> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(ProviderError::authentication("timed out waiting for OAuth callback"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(ProviderError::authentication("OAuth callback listener stopped"))
        }
    }
}

/// Handles one request on the loopback server.
///
/// Returns `None` for requests that are not the callback (favicon probes).
fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<AuthorizationCallback>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    // GET /callback?code=...&state=... HTTP/1.1
    let mut parts = request_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let path = parts.next()?;
    if !path.starts_with("/callback") {
        return None;
    }

    let result = Url::parse(&format!("http://127.0.0.1{}", path))
        .map_err(|e| ProviderError::authentication(format!("malformed callback: {}", e)))
        .and_then(|url| AuthorizationCallback::from_url(&url));

    let page = if result.is_ok() {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization Successful</h1>\
        <p>You can close this window and return to the terminal.</p></body></html>"
    } else {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization Failed</h1>\
        <p>You can close this window.</p></body></html>"
    };
    let _ = stream.write_all(page.as_bytes());
    let _ = stream.flush();

    Some(result)
}

/// PKCE verifier, challenge and state for one authorization attempt (RFC 7636).
#[derive(Debug, Clone)]
pub struct PkceFlow {
    /// The code verifier.
    pub verifier: String,
    /// SHA-256 of the verifier, base64url without padding.
    pub challenge: String,
    /// Random CSRF state.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new flow with a random verifier and state.
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    /// Builds the Google consent page URL.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
