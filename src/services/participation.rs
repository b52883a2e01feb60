//! Participation service implementation
//!
//! Join and leave operations against an event, plus the organizer-or-member
//! participant listing.

use tracing::info;
use uuid::Uuid;

use crate::database::repositories::{EventRepository, ParticipantRepository};
use crate::models::event::Event;
use crate::models::participant::EventParticipant;
use crate::services::auth::AuthContext;
use crate::utils::errors::{AppError, Result};

/// Participation service for join/leave operations
#[derive(Clone)]
pub struct ParticipationService {
    events: EventRepository,
    participants: ParticipantRepository,
}

impl ParticipationService {
    /// Create a new ParticipationService instance
    pub fn new(events: EventRepository, participants: ParticipantRepository) -> Self {
        Self { events, participants }
    }

    /// Register the caller for an active event with free capacity
    pub async fn join(&self, auth: &AuthContext, event_id: Uuid) -> Result<EventParticipant> {
        let participant = self.participants.join_event(event_id, auth.user_id).await?;
        info!(event_id = %event_id, user_id = %auth.user_id, "User joined event");
        Ok(participant)
    }

    /// Cancel the caller's registration; the row is kept for history
    pub async fn leave(&self, auth: &AuthContext, event_id: Uuid) -> Result<EventParticipant> {
        let participant = self
            .participants
            .cancel_registration(event_id, auth.user_id)
            .await?;
        info!(event_id = %event_id, user_id = %auth.user_id, "User left event");
        Ok(participant)
    }

    /// List registered participants, visible to the organizer and to
    /// currently registered members only
    pub async fn list_participants(
        &self,
        auth: &AuthContext,
        event_id: Uuid,
    ) -> Result<Vec<EventParticipant>> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(AppError::EventNotFound { event_id })?;

        let own_registration = self.participants.find(event_id, auth.user_id).await?;
        if !can_view_participants(&event, auth.user_id, own_registration.as_ref()) {
            return Err(AppError::Forbidden(
                "Not authorized to view participants".to_string(),
            ));
        }

        self.participants.list_registered(event_id).await
    }
}

/// Only the organizer and currently registered participants may see the list
fn can_view_participants(
    event: &Event,
    viewer_id: Uuid,
    viewer_registration: Option<&EventParticipant>,
) -> bool {
    event.organizer_id == viewer_id
        || viewer_registration.is_some_and(EventParticipant::is_registered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventStatus;
    use crate::models::participant::ParticipantStatus;
    use chrono::Utc;
    use sqlx::types::Json;

    fn event(organizer_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            organizer_id,
            title: "Lake Loop".to_string(),
            description: "Easy lakeside walk".to_string(),
            categories: Json(vec![]),
            image_key: None,
            location: "Lake District".to_string(),
            event_date: now,
            event_time: "09:00".to_string(),
            max_participants: None,
            status: EventStatus::Active.as_str().to_string(),
            search_text: "lake loop easy lakeside walk".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn registration(event_id: Uuid, user_id: Uuid, status: ParticipantStatus) -> EventParticipant {
        EventParticipant {
            event_id,
            user_id,
            status: status.as_str().to_string(),
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_organizer_can_view() {
        let organizer = Uuid::new_v4();
        let event = event(organizer);
        assert!(can_view_participants(&event, organizer, None));
    }

    #[test]
    fn test_registered_member_can_view() {
        let event = event(Uuid::new_v4());
        let viewer = Uuid::new_v4();
        let reg = registration(event.id, viewer, ParticipantStatus::Registered);
        assert!(can_view_participants(&event, viewer, Some(&reg)));
    }

    #[test]
    fn test_cancelled_member_cannot_view() {
        let event = event(Uuid::new_v4());
        let viewer = Uuid::new_v4();
        let reg = registration(event.id, viewer, ParticipantStatus::Cancelled);
        assert!(!can_view_participants(&event, viewer, Some(&reg)));
    }

    #[test]
    fn test_stranger_cannot_view() {
        let event = event(Uuid::new_v4());
        assert!(!can_view_participants(&event, Uuid::new_v4(), None));
    }
}
