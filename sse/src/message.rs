//! Typed events carried on a changes stream.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// Events pushed to clients watching a recipe's changes feed.
///
/// A variant's payload serializes to the `data:` line of the wire record;
/// the `event:` line comes from [`EventType`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Event {
    /// Periodic heartbeat carrying the emission time.
    Update { time: String },
}

impl Event {
    /// An update stamped with the current UTC time in ISO-8601 with
    /// millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
    pub fn update_now() -> Self {
        Event::Update {
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::Update { .. } => "update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_serializes_to_the_bare_payload() {
        let event = Event::Update {
            time: "2024-01-01T00:00:00.000Z".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            "{\"time\":\"2024-01-01T00:00:00.000Z\"}"
        );
    }

    #[test]
    fn update_now_uses_millisecond_utc() {
        let Event::Update { time } = Event::update_now();
        // 2024-01-01T00:00:00.000Z is fixed-width up to the fractional part.
        assert!(time.ends_with('Z'), "expected UTC suffix: {time}");
        assert_eq!(time.len(), "2024-01-01T00:00:00.000Z".len(), "{time}");
        assert_eq!(&time[23..], "Z");
    }

    #[test]
    fn event_type_matches_the_wire_name() {
        assert_eq!(Event::update_now().event_type(), "update");
    }
}
