//! Participation repository implementation
//!
//! Join is a single transaction that locks the event row before the duplicate
//! and capacity checks, so concurrent joins at the capacity boundary
//! serialize instead of both passing the check.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::change::{ChangeEntity, ChangeOperation};
use crate::models::event::Event;
use crate::models::participant::{EventParticipant, ParticipantStatus};
use crate::utils::errors::AppError;
use super::change::ChangeRepository;

const PARTICIPANT_COLUMNS: &str = "event_id, user_id, status, registered_at";

#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a registration row for an (event, user) pair
    pub async fn find(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventParticipant>, AppError> {
        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// All registered participants of an event, oldest registration first
    pub async fn list_registered(&self, event_id: Uuid) -> Result<Vec<EventParticipant>, AppError> {
        let participants = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 AND status = $2 ORDER BY registered_at ASC"
        ))
        .bind(event_id)
        .bind(ParticipantStatus::Registered.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Count of registered participants for an event
    pub async fn count_registered(&self, event_id: Uuid) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status = $2"
        )
        .bind(event_id)
        .bind(ParticipantStatus::Registered.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Register the caller for an event, atomically enforcing the
    /// active-status, duplicate-registration and capacity rules
    pub async fn join_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<EventParticipant, AppError> {
        let mut tx = self.pool.begin().await?;

        // The row lock serializes concurrent joins for the same event.
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, organizer_id, title, description, categories, image_key, location, event_date, event_time, max_participants, status, search_text, created_at, updated_at FROM events WHERE id = $1 FOR UPDATE"
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::EventNotFound { event_id })?;

        if !event.is_active() {
            return Err(AppError::EventNotFound { event_id });
        }

        let existing = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.as_ref().is_some_and(|p| p.is_registered()) {
            return Err(AppError::Conflict(
                "Already registered for this event".to_string(),
            ));
        }

        if let Some(max) = event.max_participants {
            let count: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status = $2"
            )
            .bind(event_id)
            .bind(ParticipantStatus::Registered.as_str())
            .fetch_one(&mut *tx)
            .await?;

            if count.0 >= i64::from(max) {
                return Err(AppError::CapacityExceeded { event_id });
            }
        }

        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            INSERT INTO event_participants (event_id, user_id, status, registered_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (event_id, user_id)
            DO UPDATE SET status = $3, registered_at = NOW()
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(ParticipantStatus::Registered.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // A re-join after leaving is a modification, not a fresh
        // registration, and produces no confirmation email downstream.
        let operation = if existing.is_some() {
            ChangeOperation::Modify
        } else {
            ChangeOperation::Insert
        };
        let old_value = existing.as_ref().map(serde_json::to_value).transpose()?;
        let new_value = serde_json::to_value(&participant)?;
        ChangeRepository::append(
            &mut *tx,
            ChangeEntity::Participant,
            operation,
            old_value.as_ref(),
            &new_value,
        )
        .await?;

        tx.commit().await?;
        Ok(participant)
    }

    /// Flip the caller's registration to cancelled; the row is retained
    pub async fn cancel_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<EventParticipant, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::RegistrationNotFound { event_id })?;

        let updated = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            UPDATE event_participants
            SET status = $3
            WHERE event_id = $1 AND user_id = $2
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(ParticipantStatus::Cancelled.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let old_value = serde_json::to_value(&existing)?;
        let new_value = serde_json::to_value(&updated)?;
        ChangeRepository::append(
            &mut *tx,
            ChangeEntity::Participant,
            ChangeOperation::Modify,
            Some(&old_value),
            &new_value,
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
