//! Time windows for event queries.
//!
//! Tool inputs carry timestamps as ISO-8601 strings and hand them to the
//! provider unchanged. The only time arithmetic done locally is computing the
//! default window: the current UTC day.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};

/// A closed time range used to bound event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns the UTC day containing `now`: 00:00:00 through 23:59:59.
    pub fn utc_day(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = date
            .and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
            .and_utc();
        Self { start, end }
    }

    /// Returns the current UTC day.
    pub fn today() -> Self {
        Self::utc_day(Utc::now())
    }

    /// Returns the start bound as an RFC 3339 string with a `+00:00` offset.
    pub fn start_rfc3339(&self) -> String {
        format_rfc3339(self.start)
    }

    /// Returns the end bound as an RFC 3339 string with a `+00:00` offset.
    pub fn end_rfc3339(&self) -> String {
        format_rfc3339(self.end)
    }
}

/// Formats a UTC timestamp at second precision, e.g. `2025-01-15T00:00:00+00:00`.
pub fn format_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}
