//! Raw provider JSON to canonical record conversion.
//!
//! Provider payloads are loosely shaped: almost every key is optional and
//! nested objects may be missing entirely. Each function here is total. A
//! missing key, a value of the wrong type, or a non-object input all fall
//! back to the record's default for that field.

use std::collections::BTreeMap;

use gcal_mcp_core::{Attendee, CalendarInfo, Event, FreeBusySlot};
use serde_json::Value;
use tracing::warn;

/// Converts a raw `events` resource into an [`Event`].
///
/// `calendar_id` is stamped onto the record as given; the provider payload
/// does not carry it.
pub fn normalize_event(raw: &Value, calendar_id: &str) -> Event {
    let start = raw.get("start");
    let end = raw.get("end");

    let all_day = start
        .map(|s| s.get("date").is_some() && s.get("dateTime").is_none())
        .unwrap_or(false);

    let attendees = raw
        .get("attendees")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(normalize_attendee).collect())
        .unwrap_or_default();

    Event {
        id: str_field(raw, "id"),
        summary: str_field(raw, "summary"),
        description: str_field(raw, "description"),
        location: str_field(raw, "location"),
        start: event_time(start),
        end: event_time(end),
        all_day,
        status: str_field(raw, "status"),
        attendees,
        hangout_link: str_field(raw, "hangoutLink"),
        html_link: str_field(raw, "htmlLink"),
        creator_email: raw.get("creator").map(|c| str_field(c, "email")).unwrap_or_default(),
        organizer_email: raw
            .get("organizer")
            .map(|o| str_field(o, "email"))
            .unwrap_or_default(),
        recurring_event_id: raw
            .get("recurringEventId")
            .and_then(Value::as_str)
            .map(str::to_string),
        calendar_id: calendar_id.to_string(),
    }
}

/// Converts every entry of a list response's `items` array.
pub fn normalize_events(raw: &Value, calendar_id: &str) -> Vec<Event> {
    items(raw)
        .iter()
        .map(|item| normalize_event(item, calendar_id))
        .collect()
}

/// Converts a raw `calendarList` entry into a [`CalendarInfo`].
pub fn normalize_calendar(raw: &Value) -> CalendarInfo {
    CalendarInfo {
        id: str_field(raw, "id"),
        summary: str_field(raw, "summary"),
        description: str_field(raw, "description"),
        time_zone: str_field(raw, "timeZone"),
        primary: bool_field(raw, "primary"),
    }
}

/// Converts every entry of a `calendarList.list` response.
pub fn normalize_calendars(raw: &Value) -> Vec<CalendarInfo> {
    items(raw).iter().map(normalize_calendar).collect()
}

/// Converts one raw attendee entry into an [`Attendee`].
pub fn normalize_attendee(raw: &Value) -> Attendee {
    Attendee {
        email: str_field(raw, "email"),
        display_name: str_field(raw, "displayName"),
        response_status: str_field(raw, "responseStatus"),
        organizer: bool_field(raw, "organizer"),
    }
}

/// Converts one raw busy interval into a [`FreeBusySlot`].
pub fn normalize_free_busy_slot(raw: &Value) -> FreeBusySlot {
    FreeBusySlot {
        start: str_field(raw, "start"),
        end: str_field(raw, "end"),
    }
}

/// Reshapes a `freebusy.query` response into calendar id to busy slots.
///
/// Calendars the provider could not query still appear, with whatever busy
/// list came back (usually empty); the per-calendar error is logged.
pub fn normalize_free_busy(raw: &Value) -> BTreeMap<String, Vec<FreeBusySlot>> {
    let Some(calendars) = raw.get("calendars").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    calendars
        .iter()
        .map(|(id, entry)| {
            if let Some(errors) = entry.get("errors").and_then(Value::as_array) {
                for error in errors {
                    warn!(
                        calendar_id = %id,
                        reason = %str_field(error, "reason"),
                        "free/busy lookup failed for calendar"
                    );
                }
            }
            let slots = entry
                .get("busy")
                .and_then(Value::as_array)
                .map(|busy| busy.iter().map(normalize_free_busy_slot).collect())
                .unwrap_or_default();
            (id.clone(), slots)
        })
        .collect()
}

/// Picks a non-empty `dateTime`, then `date`, then empty.
fn event_time(raw: Option<&Value>) -> String {
    raw.and_then(|t| {
        t.get("dateTime")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| t.get("date").and_then(Value::as_str))
    })
    .unwrap_or_default()
    .to_string()
}

fn items(raw: &Value) -> &[Value] {
    raw.get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bool_field(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(false)
}
