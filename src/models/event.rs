//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub categories: Json<Vec<CategoryTag>>,
    pub image_key: Option<String>,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub event_time: String,
    pub max_participants: Option<i32>,
    pub status: String,
    pub search_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active.as_str()
    }
}

/// A trail category with its difficulty grade, e.g. ("Alpine", "hard").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTag {
    pub name: String,
    pub difficulty: String,
}

/// Mutable event fields supplied by the organizer on create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub categories: Vec<CategoryTag>,
    pub image_key: Option<String>,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub event_time: String,
    pub max_participants: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search_term: Option<String>,
}

/// One page of active events plus the continuation token for the next page.
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Active,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(EventStatus::Active),
            "cancelled" => Some(EventStatus::Cancelled),
            "completed" => Some(EventStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase concatenation of title and description, kept in sync on every
/// create and update so substring search stays consistent with the content.
pub fn build_search_text(title: &str, description: &str) -> String {
    format!("{} {}", title.to_lowercase(), description.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [EventStatus::Active, EventStatus::Cancelled, EventStatus::Completed] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EventStatus::parse("deleted"), None);
    }

    #[test]
    fn test_build_search_text() {
        assert_eq!(
            build_search_text("Ridge Traverse", "A LONG alpine Day"),
            "ridge traverse a long alpine day"
        );
    }
}
