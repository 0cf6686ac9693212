//! Google Calendar API v3 REST client.
//!
//! One method per remote call. Responses are returned as raw JSON and left
//! to the normalizer; status codes are folded into [`ProviderError`] codes.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarRemote, EventListQuery};

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar API client bound to one access token.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    /// Points the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    /// Sends a request and decodes the JSON body of a successful response.
    async fn send_json(&self, request: reqwest::RequestBuilder) -> ProviderResult<Value> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| {
            ProviderError::remote(format!("failed to read response: {}", e)).with_source(e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::remote(format!("failed to parse response: {}", e)).with_source(e)
        })
    }

    /// Sends a request and maps transport failures and error statuses.
    async fn send(&self, request: reqwest::RequestBuilder) -> ProviderResult<reqwest::Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                ProviderError::remote(message).with_source(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "provider returned error status");
        Err(ProviderError::from_response(status.as_u16(), &body))
    }
}

impl CalendarRemote for GoogleCalendarClient {
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Value>> {
        Box::pin(async move {
            let url = format!("{}/users/me/calendarList", self.base_url);
            self.send_json(self.http_client.get(&url)).await
        })
    }

    fn get_calendar<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            let url = format!(
                "{}/users/me/calendarList/{}",
                self.base_url,
                urlencoding::encode(calendar_id)
            );
            self.send_json(self.http_client.get(&url)).await
        })
    }

    fn list_events<'a>(
        &'a self,
        query: &'a EventListQuery,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            let url = self.events_url(&query.calendar_id);
            let request = self.http_client.get(&url).query(&query.query_pairs());
            let result = self.send_json(request).await?;
            let count = result.get("items").and_then(Value::as_array).map_or(0, Vec::len);
            debug!(calendar_id = %query.calendar_id, count, "listed events");
            Ok(result)
        })
    }

    fn get_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            let url = self.event_url(calendar_id, event_id);
            self.send_json(self.http_client.get(&url)).await
        })
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            let url = self.events_url(calendar_id);
            self.send_json(self.http_client.post(&url).json(&body)).await
        })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            let url = self.event_url(calendar_id, event_id);
            self.send_json(self.http_client.put(&url).json(&body)).await
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let url = self.event_url(calendar_id, event_id);
            self.send(self.http_client.delete(&url)).await?;
            Ok(())
        })
    }

    fn quick_add<'a>(
        &'a self,
        calendar_id: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            let url = format!("{}/quickAdd", self.events_url(calendar_id));
            let request = self.http_client.post(&url).query(&[("text", text)]);
            self.send_json(request).await
        })
    }

    fn free_busy(&self, body: Value) -> BoxFuture<'_, ProviderResult<Value>> {
        Box::pin(async move {
            let url = format!("{}/freeBusy", self.base_url);
            self.send_json(self.http_client.post(&url).json(&body)).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    /// Answers one request with `body` and returns the request line.
    fn api_server(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request_line
        });
        (base, handle)
    }

    fn client() -> GoogleCalendarClient {
        GoogleCalendarClient::new("token", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn event_urls_are_encoded() {
        let client = client();
        assert_eq!(
            client.events_url("team@group.calendar.google.com"),
            "https://www.googleapis.com/calendar/v3/calendars/team%40group.calendar.google.com/events"
        );
        assert_eq!(
            client.event_url("primary", "evt 1"),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events/evt%201"
        );
    }

    #[test]
    fn base_url_override_trims_slash() {
        let client = client().with_base_url("http://127.0.0.1:9999/v3/");
        assert_eq!(
            client.events_url("primary"),
            "http://127.0.0.1:9999/v3/calendars/primary/events"
        );
    }

    #[tokio::test]
    async fn connection_failure_is_remote_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = client().with_base_url(format!("http://127.0.0.1:{port}"));
        let err = client.list_calendars().await.unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::RemoteServiceError
        );
    }

    #[tokio::test]
    async fn list_events_returns_provider_payload() {
        let (base, server) = api_server(r#"{"items": [{"id": "a"}, {"id": "b"}]}"#);
        let client = client().with_base_url(base);
        let query = EventListQuery::new("primary", "2025-01-15T00:00:00Z", "2025-01-15T23:59:59Z")
            .with_query(Some("standup".to_string()));

        let result = client.list_events(&query).await.unwrap();
        assert_eq!(result["items"].as_array().map(Vec::len), Some(2));

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /calendars/primary/events?"));
        assert!(request_line.contains("singleEvents=true"));
        assert!(request_line.contains("q=standup"));
    }
}
