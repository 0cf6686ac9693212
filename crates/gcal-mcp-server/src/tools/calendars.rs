//! `list_calendars` and `get_calendar`.

use serde::Deserialize;
use tracing::debug;

use gcal_mcp_core::CalendarInfo;
use gcal_mcp_providers::{ProviderResult, normalize_calendar, normalize_calendars};

use super::CalendarTools;

/// Arguments of `get_calendar`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarArgs {
    #[serde(default)]
    pub calendar_id: Option<String>,
}

impl CalendarTools {
    /// Lists every calendar on the user's calendar list.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarInfo>> {
        let remote = self.remote().await?;
        let raw = remote.list_calendars().await?;
        let calendars = normalize_calendars(&raw);
        debug!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }

    /// Fetches one calendar list entry.
    pub async fn get_calendar(&self, args: CalendarArgs) -> ProviderResult<CalendarInfo> {
        let calendar_id = self.calendar_id(args.calendar_id);
        let remote = self.remote().await?;
        let raw = remote.get_calendar(&calendar_id).await?;
        Ok(normalize_calendar(&raw))
    }
}
