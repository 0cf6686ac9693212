//! Server command: serve the calendar tools on stdio until stdin closes.

use std::sync::Arc;

use tracing::info;

use gcal_mcp_providers::google::CredentialManager;
use gcal_mcp_server::{CalendarTools, McpHandler, Settings, ToolDefaults, serve_stdio};

use crate::error::ClientResult;

/// Builds the tool set over the credential manager and serves it.
///
/// Credentials are not read until the first tool call, so a missing
/// credentials file surfaces as a tool error rather than a startup failure.
pub async fn run(settings: Settings) -> ClientResult<()> {
    info!(
        credentials = %settings.credentials_path.display(),
        default_calendar = %settings.default_calendar,
        max_results = settings.max_results,
        "starting tool server"
    );

    let credentials = CredentialManager::new(settings.credential_paths());
    let tools = CalendarTools::new(Arc::new(credentials), ToolDefaults::from(&settings));
    serve_stdio(Arc::new(McpHandler::new(tools))).await?;
    Ok(())
}
