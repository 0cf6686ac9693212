//! `check_availability`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use gcal_mcp_core::FreeBusySlot;
use gcal_mcp_providers::{ProviderResult, normalize_free_busy};

use super::CalendarTools;

/// Calendar queried when the caller names none, regardless of the configured default.
pub const AVAILABILITY_CALENDAR: &str = "primary";

/// Arguments of `check_availability`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityArgs {
    pub time_min: String,
    pub time_max: String,
    #[serde(default)]
    pub calendars: Option<Vec<String>>,
}

impl CalendarTools {
    /// Queries busy ranges for every requested calendar in one call.
    pub async fn check_availability(
        &self,
        args: AvailabilityArgs,
    ) -> ProviderResult<BTreeMap<String, Vec<FreeBusySlot>>> {
        let calendars = args
            .calendars
            .filter(|ids| !ids.is_empty())
            .unwrap_or_else(|| vec![AVAILABILITY_CALENDAR.to_string()]);

        let body = json!({
            "timeMin": args.time_min,
            "timeMax": args.time_max,
            "items": calendars.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        });

        let remote = self.remote().await?;
        let raw = remote.free_busy(body).await?;
        let busy = normalize_free_busy(&raw);
        debug!(calendars = busy.len(), "checked availability");
        Ok(busy)
    }
}
