//! Calendar event shape shared with page components.
//!
//! The core neither stores nor queries these; it only needs the shape so the
//! quiz context can link an event to a progress entry via `content_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventType {
    Practice,
    Broadcast,
    Community,
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_type: CalendarEventType,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Quiz or practice content this event points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Whether the event overlaps `at`. Events without an end are instants.
    pub fn is_ongoing(&self, at: DateTime<Utc>) -> bool {
        match self.end_time {
            Some(end) => self.start_time <= at && at < end,
            None => self.start_time == at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_row() {
        let json = r#"{
            "id": "evt-1",
            "title": "Morning practice",
            "event_type": "practice",
            "start_time": "2025-03-01T09:00:00Z",
            "end_time": "2025-03-01T09:30:00Z",
            "content_id": "quiz-12",
            "created_at": "2025-02-20T10:00:00Z",
            "updated_at": "2025-02-20T10:00:00Z"
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, CalendarEventType::Practice);
        assert_eq!(event.content_id.as_deref(), Some("quiz-12"));
        assert!(event.description.is_none());
    }

    #[test]
    fn test_rejects_unknown_event_type() {
        let json = r#"{
            "id": "evt-2",
            "title": "x",
            "event_type": "webinar",
            "start_time": "2025-03-01T09:00:00Z",
            "created_at": "2025-02-20T10:00:00Z",
            "updated_at": "2025-02-20T10:00:00Z"
        }"#;
        assert!(serde_json::from_str::<CalendarEvent>(json).is_err());
    }

    #[test]
    fn test_is_ongoing() {
        let json = r#"{
            "id": "evt-3",
            "title": "Broadcast",
            "event_type": "broadcast",
            "start_time": "2025-03-01T09:00:00Z",
            "end_time": "2025-03-01T10:00:00Z",
            "created_at": "2025-02-20T10:00:00Z",
            "updated_at": "2025-02-20T10:00:00Z"
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        let inside: DateTime<Utc> = "2025-03-01T09:15:00Z".parse().unwrap();
        let after: DateTime<Utc> = "2025-03-01T10:00:00Z".parse().unwrap();
        assert!(event.is_ongoing(inside));
        assert!(!event.is_ongoing(after));
    }
}
