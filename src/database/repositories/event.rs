//! Event repository implementation
//!
//! All writes append a change record in the same transaction, so downstream
//! consumers observe every insert and modification in order.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::change::{ChangeEntity, ChangeOperation};
use crate::models::event::{Event, EventDraft, EventFilter, EventStatus};
use crate::utils::errors::AppError;
use crate::utils::pagination::EventCursor;
use super::change::ChangeRepository;

const EVENT_COLUMNS: &str = "id, organizer_id, title, description, categories, image_key, location, event_date, event_time, max_participants, status, search_text, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a fully constructed event
    pub async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let stored = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events ({EVENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(event.organizer_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.categories)
        .bind(&event.image_key)
        .bind(&event.location)
        .bind(event.event_date)
        .bind(&event.event_time)
        .bind(event.max_participants)
        .bind(&event.status)
        .bind(&event.search_text)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        let new_value = serde_json::to_value(&stored)?;
        ChangeRepository::append(
            &mut *tx,
            ChangeEntity::Event,
            ChangeOperation::Insert,
            None,
            &new_value,
        )
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// List active events with optional date range and substring search,
    /// keyset-paginated on (event_date, id) ascending
    pub async fn list_active(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventCursor>,
        limit: i64,
    ) -> Result<Vec<Event>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = "
        ));
        query.push_bind(EventStatus::Active.as_str());

        if let Some(start) = filter.start_date {
            query.push(" AND event_date >= ");
            query.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND event_date <= ");
            query.push_bind(end);
        }
        if let Some(term) = &filter.search_term {
            query.push(" AND search_text LIKE ");
            query.push_bind(format!("%{}%", escape_like(&term.to_lowercase())));
            query.push(" ESCAPE '\\'");
        }
        if let Some(cursor) = cursor {
            query.push(" AND (event_date, id) > (");
            query.push_bind(cursor.event_date);
            query.push(", ");
            query.push_bind(cursor.event_id);
            query.push(")");
        }

        query.push(" ORDER BY event_date ASC, id ASC LIMIT ");
        query.push_bind(limit);

        let events = query
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Replace the mutable fields of an event. Identifier, organizer, status
    /// and creation timestamp are never touched.
    pub async fn update_details(
        &self,
        id: Uuid,
        draft: &EventDraft,
        search_text: &str,
    ) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::EventNotFound { event_id: id })?;

        let updated = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                categories = $4,
                image_key = $5,
                location = $6,
                event_date = $7,
                event_time = $8,
                max_participants = $9,
                search_text = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(sqlx::types::Json(&draft.categories))
        .bind(&draft.image_key)
        .bind(&draft.location)
        .bind(draft.event_date)
        .bind(&draft.event_time)
        .bind(draft.max_participants)
        .bind(search_text)
        .fetch_one(&mut *tx)
        .await?;

        let old_value = serde_json::to_value(&old)?;
        let new_value = serde_json::to_value(&updated)?;
        ChangeRepository::append(
            &mut *tx,
            ChangeEntity::Event,
            ChangeOperation::Modify,
            Some(&old_value),
            &new_value,
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Conditionally transition an event's status. Returns `None` when the
    /// event exists but is not in the expected `from` status.
    pub async fn set_status(
        &self,
        id: Uuid,
        from: EventStatus,
        to: EventStatus,
    ) -> Result<Option<Event>, AppError> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::EventNotFound { event_id: id })?;

        if old.status != from.as_str() {
            tx.rollback().await?;
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(to.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let old_value = serde_json::to_value(&old)?;
        let new_value = serde_json::to_value(&updated)?;
        ChangeRepository::append(
            &mut *tx,
            ChangeEntity::Event,
            ChangeOperation::Modify,
            Some(&old_value),
            &new_value,
        )
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// One page of active events whose date is already behind `before`,
    /// for the auto-completion sweep
    pub async fn list_past_active(
        &self,
        before: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 AND event_date < $2 ORDER BY event_date ASC, id ASC LIMIT $3"
        ))
        .bind(EventStatus::Active.as_str())
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

/// Escape `LIKE` metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("10_mile"), "10\\_mile");
        assert_eq!(escape_like("100% gravel"), "100\\% gravel");
        assert_eq!(escape_like("north\\south"), "north\\\\south");
        assert_eq!(escape_like("ridge"), "ridge");
    }
}
