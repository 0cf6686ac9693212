//! Canonical calendar records.
//!
//! These are the normalized, alias-consistent shapes handed back to callers:
//! - [`CalendarInfo`]: one entry of the user's calendar list
//! - [`Attendee`]: one guest on an event
//! - [`Event`]: a single event (or one instance of a recurring series)
//! - [`FreeBusySlot`]: one busy interval from a free/busy query
//!
//! Every field defaults to an empty value when absent. Fields that have a
//! provider wire name serialize under that name and accept both spellings
//! when deserialized.

use serde::{Deserialize, Serialize};

/// A calendar the user has access to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    /// Provider-assigned calendar identifier.
    pub id: String,
    /// Calendar title.
    #[serde(default)]
    pub summary: String,
    /// Calendar description.
    #[serde(default)]
    pub description: String,
    /// IANA time zone of the calendar.
    #[serde(default, rename = "timeZone", alias = "time_zone")]
    pub time_zone: String,
    /// Whether this is the user's primary calendar.
    #[serde(default)]
    pub primary: bool,
}

impl CalendarInfo {
    /// Creates a calendar record with only an id and title.
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }
}

/// A guest on an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Attendee email address, the only stable identity key.
    pub email: String,
    /// Display name, if the provider knows one.
    #[serde(default, rename = "displayName", alias = "display_name")]
    pub display_name: String,
    /// RSVP status: `needsAction`, `declined`, `tentative` or `accepted`.
    ///
    /// Empty when the provider did not report one.
    #[serde(default, rename = "responseStatus", alias = "response_status")]
    pub response_status: String,
    /// Whether this attendee organizes the event.
    #[serde(default)]
    pub organizer: bool,
}

impl Attendee {
    /// Creates an attendee with only an email address.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

/// A calendar event.
///
/// `start` and `end` hold either full RFC 3339 timestamps or, for all-day
/// events, plain `YYYY-MM-DD` dates. `all_day` tells which.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier, unique within its calendar.
    pub id: String,
    /// Event title.
    #[serde(default)]
    pub summary: String,
    /// Event description.
    #[serde(default)]
    pub description: String,
    /// Event location.
    #[serde(default)]
    pub location: String,
    /// Start timestamp or date.
    pub start: String,
    /// End timestamp or date.
    pub end: String,
    /// Whether the event spans whole days.
    #[serde(default)]
    pub all_day: bool,
    /// Event status: `confirmed`, `tentative` or `cancelled`.
    #[serde(default)]
    pub status: String,
    /// Guests, in provider order.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Google Meet / Hangout link.
    #[serde(default, rename = "hangoutLink", alias = "hangout_link")]
    pub hangout_link: String,
    /// Link to the event in the calendar web UI.
    #[serde(default, rename = "htmlLink", alias = "html_link")]
    pub html_link: String,
    /// Email of the event creator.
    #[serde(default)]
    pub creator_email: String,
    /// Email of the event organizer.
    #[serde(default)]
    pub organizer_email: String,
    /// Series id, set only on instances of a recurring event.
    #[serde(default, rename = "recurringEventId", alias = "recurring_event_id")]
    pub recurring_event_id: Option<String>,
    /// Calendar the event was fetched from.
    #[serde(default)]
    pub calendar_id: String,
}

impl Event {
    /// Returns true if this event is one instance of a recurring series.
    pub fn is_recurring_instance(&self) -> bool {
        self.recurring_event_id.is_some()
    }

    /// Returns the organizer attendee, if the guest list names one.
    pub fn organizer(&self) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.organizer)
    }
}

/// One busy interval reported by a free/busy query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusySlot {
    /// Start of the busy period.
    pub start: String,
    /// End of the busy period.
    pub end: String,
}

impl FreeBusySlot {
    /// Creates a busy slot.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}
