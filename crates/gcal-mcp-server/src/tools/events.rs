//! Event tools: list, get, create, update, delete and quick add.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use gcal_mcp_core::{Event, TimeWindow};
use gcal_mcp_providers::{
    EventListQuery, ProviderError, ProviderResult, normalize_event, normalize_events,
};

use super::CalendarTools;

/// Arguments of `list_events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListEventsArgs {
    pub calendar_id: Option<String>,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub max_results: Option<u32>,
    pub query: Option<String>,
    pub single_events: Option<bool>,
    pub order_by: Option<String>,
}

/// Arguments of `get_event` and `delete_event`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventArgs {
    pub event_id: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Arguments of `create_event`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventArgs {
    pub summary: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Arguments of `update_event`. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventArgs {
    pub event_id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Arguments of `quick_add`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuickAddArgs {
    pub text: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Text returned by `delete_event`.
pub fn delete_message(event_id: &str) -> String {
    format!("Event {} deleted successfully.", event_id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn attendee_list(emails: &[String]) -> Value {
    Value::Array(emails.iter().map(|email| json!({ "email": email })).collect())
}

fn date_time(value: String) -> Value {
    json!({ "dateTime": value })
}

impl CreateEventArgs {
    /// Builds the insert body; empty optional fields are left out.
    fn into_body(self) -> Value {
        let mut body = Map::new();
        body.insert("summary".into(), Value::String(self.summary));
        body.insert("start".into(), date_time(self.start));
        body.insert("end".into(), date_time(self.end));
        if let Some(description) = non_empty(self.description) {
            body.insert("description".into(), Value::String(description));
        }
        if let Some(location) = non_empty(self.location) {
            body.insert("location".into(), Value::String(location));
        }
        if let Some(attendees) = self.attendees.filter(|a| !a.is_empty()) {
            body.insert("attendees".into(), attendee_list(&attendees));
        }
        Value::Object(body)
    }
}

impl UpdateEventArgs {
    /// Writes every supplied field over `existing`.
    fn overlay(&self, existing: &mut Map<String, Value>) {
        if let Some(summary) = &self.summary {
            existing.insert("summary".into(), Value::String(summary.clone()));
        }
        if let Some(start) = &self.start {
            existing.insert("start".into(), date_time(start.clone()));
        }
        if let Some(end) = &self.end {
            existing.insert("end".into(), date_time(end.clone()));
        }
        if let Some(description) = &self.description {
            existing.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(location) = &self.location {
            existing.insert("location".into(), Value::String(location.clone()));
        }
        if let Some(attendees) = &self.attendees {
            existing.insert("attendees".into(), attendee_list(attendees));
        }
    }
}

impl CalendarTools {
    /// Lists events in a window; missing bounds default to today in UTC.
    pub async fn list_events(&self, args: ListEventsArgs) -> ProviderResult<Vec<Event>> {
        let calendar_id = self.calendar_id(args.calendar_id);
        let today = TimeWindow::today();
        let time_min = non_empty(args.time_min).unwrap_or_else(|| today.start_rfc3339());
        let time_max = non_empty(args.time_max).unwrap_or_else(|| today.end_rfc3339());

        let mut query = EventListQuery::new(&calendar_id, time_min, time_max)
            .with_max_results(args.max_results.unwrap_or(self.defaults.max_results))
            .with_query(args.query);
        if let Some(single) = args.single_events {
            query = query.with_single_events(single);
        }
        if let Some(order_by) = non_empty(args.order_by) {
            query = query.with_order_by(order_by);
        }

        let remote = self.remote().await?;
        let raw = remote.list_events(&query).await?;
        let events = normalize_events(&raw, &calendar_id);
        debug!(calendar_id = %calendar_id, count = events.len(), "listed events");
        Ok(events)
    }

    /// Fetches one event.
    pub async fn get_event(&self, args: EventArgs) -> ProviderResult<Event> {
        let calendar_id = self.calendar_id(args.calendar_id);
        let remote = self.remote().await?;
        let raw = remote.get_event(&calendar_id, &args.event_id).await?;
        Ok(normalize_event(&raw, &calendar_id))
    }

    /// Inserts a new event with timed start and end.
    pub async fn create_event(&self, args: CreateEventArgs) -> ProviderResult<Event> {
        let calendar_id = self.calendar_id(args.calendar_id.clone());
        let body = args.into_body();
        let remote = self.remote().await?;
        let raw = remote.insert_event(&calendar_id, body).await?;
        let event = normalize_event(&raw, &calendar_id);
        info!(calendar_id = %calendar_id, event_id = %event.id, "created event");
        Ok(event)
    }

    /// Reads the event, overlays the supplied fields and writes it back whole.
    pub async fn update_event(&self, args: UpdateEventArgs) -> ProviderResult<Event> {
        let calendar_id = self.calendar_id(args.calendar_id.clone());
        let remote = self.remote().await?;

        let existing = remote.get_event(&calendar_id, &args.event_id).await?;
        let Value::Object(mut merged) = existing else {
            return Err(ProviderError::remote(format!(
                "event {} came back as a non-object payload",
                args.event_id
            )));
        };
        args.overlay(&mut merged);

        let raw = remote
            .update_event(&calendar_id, &args.event_id, Value::Object(merged))
            .await?;
        info!(calendar_id = %calendar_id, event_id = %args.event_id, "updated event");
        Ok(normalize_event(&raw, &calendar_id))
    }

    /// Deletes an event and returns a confirmation line.
    pub async fn delete_event(&self, args: EventArgs) -> ProviderResult<String> {
        let calendar_id = self.calendar_id(args.calendar_id);
        let remote = self.remote().await?;
        remote.delete_event(&calendar_id, &args.event_id).await?;
        info!(calendar_id = %calendar_id, event_id = %args.event_id, "deleted event");
        Ok(delete_message(&args.event_id))
    }

    /// Lets the provider parse free text into an event.
    pub async fn quick_add(&self, args: QuickAddArgs) -> ProviderResult<Event> {
        let calendar_id = self.calendar_id(args.calendar_id);
        let remote = self.remote().await?;
        let raw = remote.quick_add(&calendar_id, &args.text).await?;
        let event = normalize_event(&raw, &calendar_id);
        info!(calendar_id = %calendar_id, event_id = %event.id, "quick-added event");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{Call, MockRemote, tools};
    use super::*;
    use gcal_mcp_providers::ProviderErrorCode;

    fn standup() -> Value {
        json!({
            "id": "evt_123",
            "summary": "Team standup",
            "description": "Daily sync",
            "location": "Conference Room A",
            "status": "confirmed",
            "start": {"dateTime": "2025-01-15T09:00:00-05:00"},
            "end": {"dateTime": "2025-01-15T09:30:00-05:00"},
            "attendees": [
                {"email": "alice@example.com", "responseStatus": "accepted", "organizer": true},
                {"email": "bob@example.com", "responseStatus": "needsAction"}
            ],
            "hangoutLink": "https://meet.google.com/abc-defg-hij",
            "creator": {"email": "alice@example.com"}
        })
    }

    fn event_args(id: &str) -> EventArgs {
        EventArgs {
            event_id: id.to_string(),
            calendar_id: None,
        }
    }

    fn update(id: &str) -> UpdateEventArgs {
        UpdateEventArgs {
            event_id: id.to_string(),
            summary: None,
            start: None,
            end: None,
            description: None,
            location: None,
            attendees: None,
            calendar_id: None,
        }
    }

    #[tokio::test]
    async fn list_defaults_to_today_without_query() {
        let (tools, remote) = tools(MockRemote::new().with_event(standup()));
        let events = tools.list_events(ListEventsArgs::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].calendar_id, "primary");

        let calls = remote.calls();
        let [Call::ListEvents(query)] = calls.as_slice() else {
            panic!("expected one list call, got {:?}", calls);
        };
        assert_eq!(query.calendar_id, "primary");
        assert!(query.time_min.ends_with("T00:00:00+00:00"));
        assert!(query.time_max.ends_with("T23:59:59+00:00"));
        assert_eq!(query.max_results, 50);
        assert!(query.single_events);
        assert_eq!(query.order_by, "startTime");
        assert!(query.query_pairs().iter().all(|(key, _)| *key != "q"));
    }

    #[tokio::test]
    async fn list_passes_explicit_arguments() {
        let (tools, remote) = tools(MockRemote::new());
        let events = tools
            .list_events(ListEventsArgs {
                calendar_id: Some("team".to_string()),
                time_min: Some("2025-01-01T00:00:00Z".to_string()),
                time_max: Some(String::new()),
                max_results: Some(5),
                query: Some("standup".to_string()),
                single_events: Some(false),
                order_by: Some("updated".to_string()),
            })
            .await
            .unwrap();
        assert!(events.is_empty());

        let calls = remote.calls();
        let [Call::ListEvents(query)] = calls.as_slice() else {
            panic!("expected one list call, got {:?}", calls);
        };
        assert_eq!(query.calendar_id, "team");
        assert_eq!(query.time_min, "2025-01-01T00:00:00Z");
        assert!(query.time_max.ends_with("T23:59:59+00:00"));
        assert_eq!(query.max_results, 5);
        assert_eq!(query.query.as_deref(), Some("standup"));
        assert!(!query.single_events);
        assert_eq!(query.order_by, "updated");
    }

    #[tokio::test]
    async fn get_normalizes_event() {
        let (tools, _) = tools(MockRemote::new().with_event(standup()));
        let event = tools.get_event(event_args("evt_123")).await.unwrap();
        assert_eq!(event.summary, "Team standup");
        assert!(!event.all_day);
        assert_eq!(event.attendees.len(), 2);
        assert!(event.attendees[0].organizer);
        assert_eq!(event.creator_email, "alice@example.com");
    }

    #[tokio::test]
    async fn get_missing_event_is_not_found() {
        let (tools, _) = tools(MockRemote::new());
        let err = tools.get_event(event_args("ghost")).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
    }

    #[tokio::test]
    async fn create_sends_minimal_body() {
        let (tools, remote) = tools(MockRemote::new());
        let event = tools
            .create_event(CreateEventArgs {
                summary: "Review".to_string(),
                start: "2025-01-15T09:00:00Z".to_string(),
                end: "2025-01-15T10:00:00Z".to_string(),
                description: Some(String::new()),
                location: None,
                attendees: Some(Vec::new()),
                calendar_id: None,
            })
            .await
            .unwrap();
        assert_eq!(event.summary, "Review");
        assert!(!event.id.is_empty());

        let calls = remote.calls();
        let [Call::InsertEvent { calendar_id, body }] = calls.as_slice() else {
            panic!("expected one insert call, got {:?}", calls);
        };
        assert_eq!(calendar_id, "primary");
        assert_eq!(
            body,
            &json!({
                "summary": "Review",
                "start": {"dateTime": "2025-01-15T09:00:00Z"},
                "end": {"dateTime": "2025-01-15T10:00:00Z"}
            })
        );
    }

    #[tokio::test]
    async fn create_includes_attendees() {
        let (tools, remote) = tools(MockRemote::new());
        tools
            .create_event(CreateEventArgs {
                summary: "Lunch".to_string(),
                start: "2025-01-15T12:00:00Z".to_string(),
                end: "2025-01-15T13:00:00Z".to_string(),
                description: Some("Catch up".to_string()),
                location: Some("Cafe".to_string()),
                attendees: Some(vec!["a@example.com".to_string(), "b@example.com".to_string()]),
                calendar_id: Some("team".to_string()),
            })
            .await
            .unwrap();

        let calls = remote.calls();
        let [Call::InsertEvent { calendar_id, body }] = calls.as_slice() else {
            panic!("expected one insert call, got {:?}", calls);
        };
        assert_eq!(calendar_id, "team");
        assert_eq!(body["description"], "Catch up");
        assert_eq!(body["location"], "Cafe");
        assert_eq!(
            body["attendees"],
            json!([{"email": "a@example.com"}, {"email": "b@example.com"}])
        );
    }

    #[tokio::test]
    async fn update_with_only_summary_keeps_other_fields() {
        let (tools, remote) = tools(MockRemote::new().with_event(standup()));
        let mut args = update("evt_123");
        args.summary = Some("Renamed".to_string());

        let event = tools.update_event(args).await.unwrap();
        assert_eq!(event.summary, "Renamed");
        assert_eq!(event.location, "Conference Room A");

        let calls = remote.calls();
        let [Call::GetEvent { .. }, Call::UpdateEvent { event_id, body, .. }] = calls.as_slice()
        else {
            panic!("expected get then update, got {:?}", calls);
        };
        assert_eq!(event_id, "evt_123");
        let mut expected = standup();
        expected["summary"] = json!("Renamed");
        assert_eq!(body, &expected);
    }

    #[tokio::test]
    async fn update_empty_string_clears_field() {
        let (tools, remote) = tools(MockRemote::new().with_event(standup()));
        let mut args = update("evt_123");
        args.location = Some(String::new());
        args.start = Some("2025-01-15T10:00:00-05:00".to_string());
        args.attendees = Some(vec!["carol@example.com".to_string()]);

        tools.update_event(args).await.unwrap();

        let calls = remote.calls();
        let Some(Call::UpdateEvent { body, .. }) = calls.last() else {
            panic!("expected an update call, got {:?}", calls);
        };
        assert_eq!(body["location"], "");
        assert_eq!(body["start"], json!({"dateTime": "2025-01-15T10:00:00-05:00"}));
        assert_eq!(body["attendees"], json!([{"email": "carol@example.com"}]));
        assert_eq!(body["description"], "Daily sync");
    }

    #[tokio::test]
    async fn update_missing_event_does_not_write() {
        let (tools, remote) = tools(MockRemote::new());
        let err = tools.update_event(update("ghost")).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
        assert_eq!(remote.calls().len(), 1);
    }

    #[tokio::test]
    async fn delete_twice_issues_same_call() {
        let (tools, remote) = tools(MockRemote::new().with_event(standup()));
        let message = tools.delete_event(event_args("evt_123")).await.unwrap();
        assert_eq!(message, "Event evt_123 deleted successfully.");

        let err = tools.delete_event(event_args("evt_123")).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);

        let expected = Call::DeleteEvent {
            calendar_id: "primary".to_string(),
            event_id: "evt_123".to_string(),
        };
        assert_eq!(remote.calls(), vec![expected.clone(), expected]);
    }

    #[tokio::test]
    async fn quick_add_passes_text() {
        let (tools, remote) = tools(MockRemote::new());
        let event = tools
            .quick_add(QuickAddArgs {
                text: "Lunch with Sarah tomorrow at noon".to_string(),
                calendar_id: None,
            })
            .await
            .unwrap();
        assert_eq!(event.summary, "Lunch with Sarah tomorrow at noon");
        assert_eq!(
            remote.calls(),
            vec![Call::QuickAdd {
                calendar_id: "primary".to_string(),
                text: "Lunch with Sarah tomorrow at noon".to_string(),
            }]
        );
    }
}
