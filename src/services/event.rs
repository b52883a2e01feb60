//! Event lifecycle service implementation
//!
//! Creation, retrieval, listing, update, and cancellation of events. This
//! service owns all writes to the event status and search text.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::database::repositories::EventRepository;
use crate::models::event::{build_search_text, Event, EventDraft, EventFilter, EventPage, EventStatus};
use crate::services::auth::AuthContext;
use crate::utils::errors::{AppError, Result};
use crate::utils::pagination::{EventCursor, PAGE_SIZE};

/// Event service for managing the event lifecycle
#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(events: EventRepository) -> Self {
        Self { events }
    }

    /// Create a new event organized by the caller
    pub async fn create(&self, auth: &AuthContext, draft: EventDraft) -> Result<Event> {
        validate_draft(&draft, Utc::now())?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: auth.user_id,
            search_text: build_search_text(&draft.title, &draft.description),
            title: draft.title,
            description: draft.description,
            categories: Json(draft.categories),
            image_key: draft.image_key,
            location: draft.location,
            event_date: draft.event_date,
            event_time: draft.event_time,
            max_participants: draft.max_participants,
            status: EventStatus::Active.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.events.create(&event).await?;
        info!(event_id = %stored.id, organizer_id = %auth.user_id, "Event created");
        Ok(stored)
    }

    /// Point lookup of a single event
    pub async fn get(&self, event_id: Uuid) -> Result<Event> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or(AppError::EventNotFound { event_id })
    }

    /// List active events with optional filters and a continuation token
    pub async fn list(&self, filter: EventFilter, token: Option<String>) -> Result<EventPage> {
        let cursor = token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(EventCursor::decode)
            .transpose()?;

        let events = self
            .events
            .list_active(&filter, cursor.as_ref(), PAGE_SIZE)
            .await?;

        // A full page may have more behind it; a short page never does.
        let next = if events.len() as i64 == PAGE_SIZE {
            events.last().map(|e| {
                EventCursor {
                    event_date: e.event_date,
                    event_id: e.id,
                }
                .encode()
            })
        } else {
            None
        };

        Ok(EventPage { events, cursor: next })
    }

    /// Replace the mutable fields of an event owned by the caller
    pub async fn update(&self, auth: &AuthContext, event_id: Uuid, draft: EventDraft) -> Result<Event> {
        let existing = self.get(event_id).await?;

        if !auth.can_manage_event(existing.organizer_id) {
            return Err(AppError::Forbidden(
                "Only the organizer or an admin may update this event".to_string(),
            ));
        }

        let search_text = build_search_text(&draft.title, &draft.description);
        let updated = self
            .events
            .update_details(event_id, &draft, &search_text)
            .await?;

        info!(event_id = %event_id, user_id = %auth.user_id, "Event updated");
        Ok(updated)
    }

    /// Cancel an active event owned by the caller
    pub async fn cancel(&self, auth: &AuthContext, event_id: Uuid) -> Result<Event> {
        let existing = self.get(event_id).await?;

        if !auth.can_manage_event(existing.organizer_id) {
            return Err(AppError::Forbidden(
                "Only the organizer or an admin may cancel this event".to_string(),
            ));
        }

        let cancelled = self
            .events
            .set_status(event_id, EventStatus::Active, EventStatus::Cancelled)
            .await?
            .ok_or_else(|| AppError::Conflict("Only active events can be cancelled".to_string()))?;

        info!(event_id = %event_id, user_id = %auth.user_id, "Event cancelled");
        Ok(cancelled)
    }
}

/// Validate organizer-supplied event fields at creation time
fn validate_draft(draft: &EventDraft, now: DateTime<Utc>) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(AppError::InvalidArgument("Title is required".to_string()));
    }

    if draft.event_date < now {
        return Err(AppError::InvalidArgument(
            "Event date cannot be in the past".to_string(),
        ));
    }

    if draft.max_participants.is_some_and(|max| max <= 0) {
        return Err(AppError::InvalidArgument(
            "Max participants must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn draft(event_date: DateTime<Utc>) -> EventDraft {
        EventDraft {
            title: "Ridge Traverse".to_string(),
            description: "A long alpine day".to_string(),
            categories: vec![],
            image_key: None,
            location: "Northern Range".to_string(),
            event_date,
            event_time: "07:00".to_string(),
            max_participants: Some(12),
        }
    }

    #[test]
    fn test_future_date_accepted() {
        let now = Utc::now();
        assert!(validate_draft(&draft(now + Duration::days(7)), now).is_ok());
    }

    #[test]
    fn test_past_date_rejected() {
        let now = Utc::now();
        assert_matches!(
            validate_draft(&draft(now - Duration::hours(1)), now),
            Err(AppError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_empty_title_rejected() {
        let now = Utc::now();
        let mut d = draft(now + Duration::days(1));
        d.title = "  ".to_string();
        assert_matches!(validate_draft(&d, now), Err(AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_non_positive_capacity_rejected() {
        let now = Utc::now();
        let mut d = draft(now + Duration::days(1));
        d.max_participants = Some(0);
        assert_matches!(validate_draft(&d, now), Err(AppError::InvalidArgument(_)));
    }
}
