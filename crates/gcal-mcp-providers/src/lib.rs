//! Calendar RPC abstraction, entity normalization and the Google backend.
//!
//! - [`CalendarRemote`]: one method per provider call, raw JSON in and out
//! - [`RemoteSource`]: hands out an authenticated remote on demand
//! - [`normalize_event`] and friends: raw JSON to canonical records
//! - [`ProviderError`]: the error taxonomy shared by every layer above
//!
//! # Architecture
//!
//! ```text
//!   tool operation
//!        │  RemoteSource::remote()
//!        ▼
//! ┌──────────────────┐   refresh / persist   ┌──────────────────┐
//! │ CredentialManager│ ────────────────────▶ │ credentials.json │
//! └────────┬─────────┘                       └──────────────────┘
//!          │ Arc<dyn CalendarRemote>
//!          ▼
//! ┌──────────────────┐
//! │GoogleCalendarClient── HTTPS ──▶ Calendar API v3
//! └────────┬─────────┘
//!          │ serde_json::Value
//!          ▼ normalize_*()
//!   Event / CalendarInfo / FreeBusySlot
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod normalize;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{
    normalize_attendee, normalize_calendar, normalize_calendars, normalize_event,
    normalize_events, normalize_free_busy, normalize_free_busy_slot,
};
pub use provider::{
    BoxFuture, CalendarRemote, DEFAULT_MAX_RESULTS, DEFAULT_ORDER_BY, EventListQuery,
    RemoteSource, StaticSource,
};
