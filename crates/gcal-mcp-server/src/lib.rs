//! MCP tool server for Google Calendar.
//!
//! This crate holds everything between stdin and the provider:
//! - `Settings` read from `GCAL_*` environment variables
//! - the nine calendar tools and their registry
//! - JSON-RPC dispatch for `initialize`, `ping`, `tools/list` and `tools/call`
//! - the newline-delimited stdio loop
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gcal_mcp_providers::google::CredentialManager;
//! use gcal_mcp_server::{CalendarTools, McpHandler, Settings, ToolDefaults, serve_stdio};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let credentials = CredentialManager::new(settings.credential_paths());
//!     let tools = CalendarTools::new(Arc::new(credentials), ToolDefaults::from(&settings));
//!     serve_stdio(Arc::new(McpHandler::new(tools))).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod handler;
mod stdio;
pub mod tools;

pub use config::{
    ENV_CREDENTIALS_PATH, ENV_DEFAULT_CALENDAR, ENV_MAX_RESULTS, ENV_OAUTH_PATH, Settings,
    expand_tilde,
};
pub use error::{ServerError, ServerResult};
pub use handler::{McpHandler, SERVER_NAME};
pub use stdio::{serve, serve_stdio};
pub use tools::{CalendarTools, ToolCallError, ToolDefaults};
