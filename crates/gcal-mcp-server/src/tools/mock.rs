//! In-memory [`CalendarRemote`] that records every call.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use gcal_mcp_providers::{
    BoxFuture, CalendarRemote, EventListQuery, ProviderError, ProviderResult, StaticSource,
};

use super::{CalendarTools, ToolDefaults};

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCalendars,
    GetCalendar(String),
    ListEvents(EventListQuery),
    GetEvent { calendar_id: String, event_id: String },
    InsertEvent { calendar_id: String, body: Value },
    UpdateEvent { calendar_id: String, event_id: String, body: Value },
    DeleteEvent { calendar_id: String, event_id: String },
    QuickAdd { calendar_id: String, text: String },
    FreeBusy(Value),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    calendars: Vec<Value>,
    events: Vec<Value>,
    free_busy: Option<Value>,
    next_id: usize,
}

/// Serves canned calendars and events; keeps events mutable across calls.
#[derive(Debug, Default)]
pub struct MockRemote {
    state: Mutex<State>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(self, calendar: Value) -> Self {
        self.state().calendars.push(calendar);
        self
    }

    pub fn with_event(self, event: Value) -> Self {
        self.state().events.push(event);
        self
    }

    pub fn with_free_busy(self, response: Value) -> Self {
        self.state().free_busy = Some(response);
        self
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }

    fn find_event(&self, event_id: &str) -> ProviderResult<Value> {
        self.state()
            .events
            .iter()
            .find(|e| e["id"] == event_id)
            .cloned()
            .ok_or_else(|| ProviderError::from_response(404, r#"{"error":{"message":"Not Found"}}"#))
    }

    fn store(&self, mut body: Value) -> Value {
        let mut state = self.state();
        if body.get("id").is_none() {
            state.next_id += 1;
            body["id"] = json!(format!("evt_new_{}", state.next_id));
        }
        let id = body["id"].clone();
        state.events.retain(|e| e["id"] != id);
        state.events.push(body.clone());
        body
    }
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(std::future::ready(value))
}

impl CalendarRemote for MockRemote {
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Value>> {
        self.record(Call::ListCalendars);
        let items = self.state().calendars.clone();
        ready(Ok(json!({ "items": items })))
    }

    fn get_calendar<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, ProviderResult<Value>> {
        self.record(Call::GetCalendar(calendar_id.to_string()));
        let found = self
            .state()
            .calendars
            .iter()
            .find(|c| c["id"] == calendar_id)
            .cloned()
            .ok_or_else(|| ProviderError::from_response(404, ""));
        ready(found)
    }

    fn list_events<'a>(
        &'a self,
        query: &'a EventListQuery,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        self.record(Call::ListEvents(query.clone()));
        let items = self.state().events.clone();
        ready(Ok(json!({ "items": items })))
    }

    fn get_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        self.record(Call::GetEvent {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        });
        ready(self.find_event(event_id))
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        self.record(Call::InsertEvent {
            calendar_id: calendar_id.to_string(),
            body: body.clone(),
        });
        ready(Ok(self.store(body)))
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        self.record(Call::UpdateEvent {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
            body: body.clone(),
        });
        ready(Ok(self.store(body)))
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        self.record(Call::DeleteEvent {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        });
        let result = self.find_event(event_id).map(|_| {
            self.state().events.retain(|e| e["id"] != event_id);
        });
        ready(result)
    }

    fn quick_add<'a>(
        &'a self,
        calendar_id: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        self.record(Call::QuickAdd {
            calendar_id: calendar_id.to_string(),
            text: text.to_string(),
        });
        ready(Ok(self.store(json!({ "summary": text }))))
    }

    fn free_busy(&self, body: Value) -> BoxFuture<'_, ProviderResult<Value>> {
        self.record(Call::FreeBusy(body.clone()));
        let response = self.state().free_busy.clone().unwrap_or_else(|| {
            let calendars: serde_json::Map<String, Value> = body["items"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|item| item["id"].as_str())
                .map(|id| (id.to_string(), json!({ "busy": [] })))
                .collect();
            json!({ "calendars": calendars })
        });
        ready(Ok(response))
    }
}

/// Builds a tool set over `remote` with default settings.
pub fn tools(remote: MockRemote) -> (CalendarTools, Arc<MockRemote>) {
    tools_with(remote, ToolDefaults::default())
}

pub fn tools_with(remote: MockRemote, defaults: ToolDefaults) -> (CalendarTools, Arc<MockRemote>) {
    let remote = Arc::new(remote);
    let source = StaticSource::new(Arc::clone(&remote) as Arc<dyn CalendarRemote>);
    let tools = CalendarTools::new(Arc::new(source), defaults);
    (tools, remote)
}
