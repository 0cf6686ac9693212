//! Core types: canonical calendar records, time windows, tracing

pub mod calendar;
pub mod time;
pub mod tracing;

pub use calendar::{Attendee, CalendarInfo, Event, FreeBusySlot};
pub use time::{TimeWindow, format_rfc3339};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
