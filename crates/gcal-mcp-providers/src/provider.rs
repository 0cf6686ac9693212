//! Calendar RPC traits.
//!
//! [`CalendarRemote`] is the seam between tool operations and the provider:
//! one method per remote call, each returning the provider's raw JSON. Tool
//! code never sees HTTP, and tests swap in an in-memory implementation.
//!
//! [`RemoteSource`] hands out an authenticated remote on demand, so the
//! credential lifecycle stays out of the tools.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep both traits object-safe, so they can be shared as
/// `Arc<dyn ...>` across tasks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default page size for event listings.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Default ordering for event listings.
pub const DEFAULT_ORDER_BY: &str = "startTime";

/// Parameters of an `events.list` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListQuery {
    /// Calendar to list.
    pub calendar_id: String,
    /// Lower bound (exclusive) on event end time, RFC 3339.
    pub time_min: String,
    /// Upper bound (exclusive) on event start time, RFC 3339.
    pub time_max: String,
    /// Page size requested from the provider.
    pub max_results: u32,
    /// Expand recurring series into instances.
    pub single_events: bool,
    /// `startTime` or `updated`.
    pub order_by: String,
    /// Free-text search; omitted from the request when empty.
    pub query: Option<String>,
}

impl EventListQuery {
    /// Creates a query with default paging and ordering.
    pub fn new(
        calendar_id: impl Into<String>,
        time_min: impl Into<String>,
        time_max: impl Into<String>,
    ) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            time_min: time_min.into(),
            time_max: time_max.into(),
            max_results: DEFAULT_MAX_RESULTS,
            single_events: true,
            order_by: DEFAULT_ORDER_BY.to_string(),
            query: None,
        }
    }

    /// Builder method to set the page size.
    pub fn with_max_results(mut self, max: u32) -> Self {
        self.max_results = max;
        self
    }

    /// Builder method to set recurring expansion.
    pub fn with_single_events(mut self, single: bool) -> Self {
        self.single_events = single;
        self
    }

    /// Builder method to set ordering.
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Builder method to set a search query. Empty strings are dropped.
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    /// Returns the HTTP query parameters for this listing.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("timeMin", self.time_min.clone()),
            ("timeMax", self.time_max.clone()),
            ("maxResults", self.max_results.to_string()),
            ("singleEvents", self.single_events.to_string()),
            ("orderBy", self.order_by.clone()),
        ];
        if let Some(q) = &self.query {
            pairs.push(("q", q.clone()));
        }
        pairs
    }
}

/// Remote calendar operations, returning raw provider JSON.
///
/// Implementations must be `Send + Sync`; a single instance serves every
/// concurrent tool call.
pub trait CalendarRemote: Send + Sync {
    /// `calendarList.list`: the response holds an `items` array.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Value>>;

    /// `calendarList.get`.
    fn get_calendar<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, ProviderResult<Value>>;

    /// `events.list`: the response holds an `items` array.
    fn list_events<'a>(&'a self, query: &'a EventListQuery)
    -> BoxFuture<'a, ProviderResult<Value>>;

    /// `events.get`.
    fn get_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>>;

    /// `events.insert`.
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, ProviderResult<Value>>;

    /// `events.update`: replaces the whole event with `body`.
    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, ProviderResult<Value>>;

    /// `events.delete`.
    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// `events.quickAdd`: the provider parses `text` into an event.
    fn quick_add<'a>(
        &'a self,
        calendar_id: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>>;

    /// `freebusy.query`.
    fn free_busy(&self, body: Value) -> BoxFuture<'_, ProviderResult<Value>>;
}

/// Supplies an authenticated [`CalendarRemote`].
pub trait RemoteSource: Send + Sync {
    /// Returns the remote, building it on first use.
    fn remote(&self) -> BoxFuture<'_, ProviderResult<Arc<dyn CalendarRemote>>>;
}

/// A source that always hands out the same, already-built remote.
#[derive(Clone)]
pub struct StaticSource {
    remote: Arc<dyn CalendarRemote>,
}

impl StaticSource {
    /// Wraps an existing remote.
    pub fn new(remote: Arc<dyn CalendarRemote>) -> Self {
        Self { remote }
    }
}

impl std::fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSource").finish_non_exhaustive()
    }
}

impl RemoteSource for StaticSource {
    fn remote(&self) -> BoxFuture<'_, ProviderResult<Arc<dyn CalendarRemote>>> {
        let remote = Arc::clone(&self.remote);
        Box::pin(async move { Ok(remote) })
    }
}
