//! Tool operations.
//!
//! Each tool reads its arguments, issues one provider call (two for
//! `update_event`), normalizes the result and renders it as compact JSON.
//! Failures come back as [`ToolCallError::Failed`] carrying the provider
//! error taxonomy; nothing is retried or partially filled in.

mod availability;
mod calendars;
mod events;
#[cfg(test)]
pub(crate) mod mock;
mod registry;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use gcal_mcp_providers::{CalendarRemote, ProviderError, ProviderResult, RemoteSource};

use crate::config::Settings;

pub use availability::{AVAILABILITY_CALENDAR, AvailabilityArgs};
pub use calendars::CalendarArgs;
pub use events::{
    CreateEventArgs, EventArgs, ListEventsArgs, QuickAddArgs, UpdateEventArgs, delete_message,
};
pub use registry::{TOOLS, ToolSpec, definitions, find_tool};

/// Values used when a tool call leaves them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefaults {
    /// Calendar id for calls that name none.
    pub calendar_id: String,
    /// Page size for `list_events`.
    pub max_results: u32,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ToolDefaults {
    fn from(settings: &Settings) -> Self {
        Self {
            calendar_id: settings.default_calendar.clone(),
            max_results: settings.max_results,
        }
    }
}

/// Why a tool call produced no result.
#[derive(Debug, Error)]
pub enum ToolCallError {
    /// No tool with that name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool ran and failed.
    #[error(transparent)]
    Failed(#[from] ProviderError),
}

/// The calendar tool set, bound to a source of authenticated remotes.
#[derive(Clone)]
pub struct CalendarTools {
    source: Arc<dyn RemoteSource>,
    defaults: ToolDefaults,
}

impl CalendarTools {
    /// Creates the tool set.
    pub fn new(source: Arc<dyn RemoteSource>, defaults: ToolDefaults) -> Self {
        Self { source, defaults }
    }

    /// Returns the defaults applied to omitted arguments.
    pub fn defaults(&self) -> &ToolDefaults {
        &self.defaults
    }

    /// Runs the named tool and returns its rendered result.
    #[tracing::instrument(skip_all, fields(tool = %name))]
    pub async fn call(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, ToolCallError> {
        let spec = find_tool(name).ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;
        debug!(annotations = ?spec.annotations, "calling tool");

        let output = match spec.name {
            "list_calendars" => render(&self.list_calendars().await?)?,
            "get_calendar" => render(&self.get_calendar(parse_args(arguments)?).await?)?,
            "list_events" => render(&self.list_events(parse_args(arguments)?).await?)?,
            "get_event" => render(&self.get_event(parse_args(arguments)?).await?)?,
            "create_event" => render(&self.create_event(parse_args(arguments)?).await?)?,
            "update_event" => render(&self.update_event(parse_args(arguments)?).await?)?,
            "delete_event" => self.delete_event(parse_args(arguments)?).await?,
            "quick_add" => render(&self.quick_add(parse_args(arguments)?).await?)?,
            "check_availability" => {
                render(&self.check_availability(parse_args(arguments)?).await?)?
            }
            other => return Err(ToolCallError::UnknownTool(other.to_string())),
        };
        Ok(output)
    }

    async fn remote(&self) -> ProviderResult<Arc<dyn CalendarRemote>> {
        self.source.remote().await
    }

    /// Resolves an optional calendar argument against the default.
    fn calendar_id(&self, requested: Option<String>) -> String {
        requested
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.defaults.calendar_id.clone())
    }
}

impl std::fmt::Debug for CalendarTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarTools")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Deserializes a tool's argument object.
fn parse_args<T: DeserializeOwned>(arguments: Map<String, Value>) -> ProviderResult<T> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| ProviderError::validation(format!("invalid arguments: {}", e)))
}

/// Renders a tool result as compact JSON.
fn render<T: Serialize>(value: &T) -> ProviderResult<String> {
    serde_json::to_string(value)
        .map_err(|e| ProviderError::remote(format!("failed to serialize result: {}", e)))
}
