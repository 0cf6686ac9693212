//! Auth command: run the OAuth grant and write the credentials file.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use gcal_mcp_providers::ProviderError;
use gcal_mcp_providers::google::{
    AuthorizationCallback, DEFAULT_TIMEOUT, LOOPBACK_PORT_RANGE, OAuthClient, OAuthCredentials,
    PkceFlow, StoredToken, scopes,
};
use gcal_mcp_server::Settings;

use crate::error::ClientResult;

/// Authorizes and saves the resulting token record.
///
/// Without `redirect_uri` a loopback listener receives the callback;
/// with it, the user pastes the redirected URL back into the terminal.
pub async fn run(settings: &Settings, redirect_uri: Option<&str>) -> ClientResult<()> {
    let app = load_app(settings)?;
    let client_id = app.client_id.clone();
    let oauth = OAuthClient::new(app, DEFAULT_TIMEOUT)?;
    let scopes = scopes();

    let token = match redirect_uri {
        None => {
            println!("Opening the browser to authorize Google Calendar access...");
            oauth.authorize_loopback(&scopes, LOOPBACK_PORT_RANGE).await?
        }
        Some(redirect_uri) => {
            let pkce = PkceFlow::new();
            println!("Open this URL in your browser:\n");
            println!("{}\n", pkce.build_auth_url(&client_id, redirect_uri, &scopes));
            println!("Then paste the URL you were redirected to (or just the code):");

            let mut stdin = BufReader::new(tokio::io::stdin());
            let callback = read_callback(&mut stdin, &pkce.state).await?;
            oauth
                .exchange_code(&callback.code, &pkce.verifier, redirect_uri, &scopes)
                .await?
        }
    };

    save(&token, settings)?;
    println!(
        "Authorization complete. Credentials saved to {}",
        settings.credentials_path.display()
    );
    Ok(())
}

/// Reads the OAuth-app file; it must name a client id.
fn load_app(settings: &Settings) -> ClientResult<OAuthCredentials> {
    let path = &settings.oauth_path;
    if !path.exists() {
        return Err(ProviderError::configuration(format!(
            "OAuth client file not found at {}. Download it from the Google Cloud console.",
            path.display()
        ))
        .into());
    }

    let app = OAuthCredentials::from_file(path)?;
    if app.client_id.is_empty() {
        return Err(ProviderError::configuration(format!(
            "no client_id in {}",
            path.display()
        ))
        .into());
    }
    Ok(app)
}

/// Reads one line of user input and checks the echoed state, if any.
async fn read_callback<R>(reader: &mut R, expected_state: &str) -> ClientResult<AuthorizationCallback>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    let callback = AuthorizationCallback::parse_input(&line)?;

    if let Some(state) = &callback.state
        && state != expected_state
    {
        return Err(ProviderError::authentication(
            "OAuth state mismatch, authorization response rejected",
        )
        .into());
    }
    Ok(callback)
}

fn save(token: &StoredToken, settings: &Settings) -> ClientResult<()> {
    token.save(&settings.credentials_path)?;
    info!(path = %settings.credentials_path.display(), "saved credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use gcal_mcp_providers::ProviderErrorCode;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        Settings {
            credentials_path: dir.path().join("credentials.json"),
            oauth_path: dir.path().join("gcp-oauth.keys.json"),
            ..Settings::default()
        }
    }

    fn provider_code(err: ClientError) -> ProviderErrorCode {
        match err {
            ClientError::Provider(e) => e.code(),
            other => panic!("expected a provider error, got {:?}", other),
        }
    }

    #[test]
    fn missing_app_file() {
        let dir = TempDir::new().unwrap();
        let err = load_app(&settings(&dir)).unwrap_err();
        assert!(err.to_string().contains("gcp-oauth.keys.json"));
        assert_eq!(provider_code(err), ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn app_file_without_client_id() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        std::fs::write(&settings.oauth_path, r#"{"installed": {"client_secret": "s"}}"#).unwrap();
        let err = load_app(&settings).unwrap_err();
        assert_eq!(provider_code(err), ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn app_file_installed() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        std::fs::write(
            &settings.oauth_path,
            r#"{"installed": {"client_id": "id", "client_secret": "s"}}"#,
        )
        .unwrap();
        assert_eq!(load_app(&settings).unwrap(), OAuthCredentials::new("id", "s"));
    }

    #[tokio::test]
    async fn pasted_redirect_url() {
        let mut input = Cursor::new(b"http://localhost/cb?code=4%2Fabc&state=xyz\n".to_vec());
        let callback = read_callback(&mut input, "xyz").await.unwrap();
        assert_eq!(callback.code, "4/abc");
    }

    #[tokio::test]
    async fn pasted_bare_code() {
        let mut input = Cursor::new(b"4/abc\n".to_vec());
        let callback = read_callback(&mut input, "xyz").await.unwrap();
        assert_eq!(callback.code, "4/abc");
        assert!(callback.state.is_none());
    }

    #[tokio::test]
    async fn state_mismatch_rejected() {
        let mut input = Cursor::new(b"http://localhost/cb?code=c&state=other\n".to_vec());
        let err = read_callback(&mut input, "xyz").await.unwrap_err();
        assert_eq!(provider_code(err), ProviderErrorCode::AuthenticationError);
    }

    #[tokio::test]
    async fn empty_input_rejected() {
        let mut input = Cursor::new(Vec::new());
        let err = read_callback(&mut input, "xyz").await.unwrap_err();
        assert_eq!(provider_code(err), ProviderErrorCode::ValidationError);
    }

    #[test]
    fn saved_record_is_loadable() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let token = StoredToken {
            token: Some("ya29.a".to_string()),
            refresh_token: Some("1//r".to_string()),
            ..Default::default()
        };
        save(&token, &settings).unwrap();
        let loaded = StoredToken::load(&settings.credentials_path).unwrap();
        assert_eq!(loaded.access_token(), Some("ya29.a"));
        assert_eq!(loaded.refresh_token(), Some("1//r"));
    }
}
