//! Static tool catalogue advertised by `tools/list`.

use serde_json::{Value, json};

use gcal_mcp_protocol::{ToolAnnotations, ToolDefinition};

/// One registered tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub annotations: ToolAnnotations,
    /// Builds the JSON Schema of the argument object.
    pub schema: fn() -> Value,
}

impl ToolSpec {
    /// Returns the `tools/list` entry for this tool.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: (self.schema)(),
            annotations: self.annotations,
        }
    }
}

/// Every tool the server exposes, in listing order.
pub static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "list_calendars",
        description: "List all calendars the user has access to. Returns JSON array.",
        annotations: ToolAnnotations::READ_ONLY,
        schema: no_arguments,
    },
    ToolSpec {
        name: "get_calendar",
        description: "Get details of a specific calendar.",
        annotations: ToolAnnotations::READ_ONLY,
        schema: get_calendar_schema,
    },
    ToolSpec {
        name: "list_events",
        description: "List calendar events within a time range. Returns JSON array of events.",
        annotations: ToolAnnotations::READ_ONLY,
        schema: list_events_schema,
    },
    ToolSpec {
        name: "get_event",
        description: "Get full details of a single calendar event.",
        annotations: ToolAnnotations::READ_ONLY,
        schema: get_event_schema,
    },
    ToolSpec {
        name: "create_event",
        description: "Create a new calendar event.",
        annotations: ToolAnnotations::WRITE,
        schema: create_event_schema,
    },
    ToolSpec {
        name: "update_event",
        description: "Update an existing calendar event. Only provided fields are changed.",
        annotations: ToolAnnotations::WRITE,
        schema: update_event_schema,
    },
    ToolSpec {
        name: "delete_event",
        description: "Delete a calendar event.",
        annotations: ToolAnnotations::DELETE,
        schema: delete_event_schema,
    },
    ToolSpec {
        name: "quick_add",
        description: "Create an event from a natural language string using Google's NLP parser.",
        annotations: ToolAnnotations::WRITE,
        schema: quick_add_schema,
    },
    ToolSpec {
        name: "check_availability",
        description: "Check free/busy status for one or more calendars. Returns busy time ranges per calendar.",
        annotations: ToolAnnotations::READ_ONLY,
        schema: check_availability_schema,
    },
];

/// Looks a tool up by name.
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Returns the full `tools/list` payload.
pub fn definitions() -> Vec<ToolDefinition> {
    TOOLS.iter().map(ToolSpec::definition).collect()
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn email_list(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

fn calendar_id() -> Value {
    string("Calendar ID. Defaults to primary.")
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn no_arguments() -> Value {
    object(json!({}), &[])
}

fn get_calendar_schema() -> Value {
    object(
        json!({ "calendar_id": string("Calendar ID to retrieve.") }),
        &[],
    )
}

fn list_events_schema() -> Value {
    object(
        json!({
            "calendar_id": string("Calendar ID to query. Defaults to primary."),
            "time_min": string("Start of time range (ISO 8601). Defaults to start of today in UTC."),
            "time_max": string("End of time range (ISO 8601). Defaults to end of today in UTC."),
            "max_results": {
                "type": "integer",
                "minimum": 1,
                "maximum": 2500,
                "description": "Maximum number of events to return (1-2500)."
            },
            "query": string("Free-text search terms to filter events."),
            "single_events": {
                "type": "boolean",
                "default": true,
                "description": "Expand recurring events into individual instances."
            },
            "order_by": {
                "type": "string",
                "enum": ["startTime", "updated"],
                "default": "startTime",
                "description": "Sort order: 'startTime' (requires singleEvents=true) or 'updated'."
            }
        }),
        &[],
    )
}

fn get_event_schema() -> Value {
    object(
        json!({
            "event_id": string("The event ID to retrieve."),
            "calendar_id": calendar_id()
        }),
        &["event_id"],
    )
}

fn create_event_schema() -> Value {
    object(
        json!({
            "summary": string("Event title."),
            "start": string("Start time in ISO 8601 format (e.g. 2025-01-15T09:00:00-05:00)."),
            "end": string("End time in ISO 8601 format."),
            "description": string("Event description."),
            "location": string("Event location."),
            "attendees": email_list("List of attendee email addresses."),
            "calendar_id": calendar_id()
        }),
        &["summary", "start", "end"],
    )
}

fn update_event_schema() -> Value {
    object(
        json!({
            "event_id": string("The event ID to update."),
            "summary": string("New event title."),
            "start": string("New start time (ISO 8601)."),
            "end": string("New end time (ISO 8601)."),
            "description": string("New event description."),
            "location": string("New event location."),
            "attendees": email_list("New list of attendee email addresses."),
            "calendar_id": calendar_id()
        }),
        &["event_id"],
    )
}

fn delete_event_schema() -> Value {
    object(
        json!({
            "event_id": string("The event ID to delete."),
            "calendar_id": calendar_id()
        }),
        &["event_id"],
    )
}

fn quick_add_schema() -> Value {
    object(
        json!({
            "text": string("Natural language event description (e.g. 'Lunch with Sarah tomorrow at noon')."),
            "calendar_id": calendar_id()
        }),
        &["text"],
    )
}

fn check_availability_schema() -> Value {
    object(
        json!({
            "time_min": string("Start of availability window (ISO 8601)."),
            "time_max": string("End of availability window (ISO 8601)."),
            "calendars": email_list("Calendar IDs to check. Defaults to [\"primary\"].")
        }),
        &["time_min", "time_max"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_unique_tools() {
        let names: std::collections::BTreeSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(TOOLS.len(), 9);
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn annotations_by_kind() {
        let hints = |name: &str| find_tool(name).map(|t| t.annotations);
        assert_eq!(hints("list_events"), Some(ToolAnnotations::READ_ONLY));
        assert_eq!(hints("check_availability"), Some(ToolAnnotations::READ_ONLY));
        assert_eq!(hints("create_event"), Some(ToolAnnotations::WRITE));
        assert_eq!(hints("update_event"), Some(ToolAnnotations::WRITE));
        assert_eq!(hints("quick_add"), Some(ToolAnnotations::WRITE));
        assert_eq!(hints("delete_event"), Some(ToolAnnotations::DELETE));
        assert!(find_tool("nope").is_none());
    }

    #[test]
    fn schemas_declare_required_fields() {
        for definition in definitions() {
            let schema = &definition.input_schema;
            assert_eq!(schema["type"], "object", "{}", definition.name);
            let properties = schema["properties"].as_object().unwrap();
            for required in schema["required"].as_array().unwrap() {
                let key = required.as_str().unwrap();
                assert!(properties.contains_key(key), "{}: {}", definition.name, key);
            }
        }
        let create = find_tool("create_event").unwrap().definition();
        assert_eq!(create.input_schema["required"], json!(["summary", "start", "end"]));
    }

    #[test]
    fn max_results_range_in_schema() {
        let list = find_tool("list_events").unwrap().definition();
        let max = &list.input_schema["properties"]["max_results"];
        assert_eq!(max["minimum"], 1);
        assert_eq!(max["maximum"], 2500);
    }
}
