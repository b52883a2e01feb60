//! Change notification dispatcher job
//!
//! Polls the change record outbox in sequence order and turns store changes
//! into participant emails. A batch is acknowledged (deleted) only after
//! every record in it was processed, so a delivery failure causes the whole
//! batch to be redelivered on the next poll. Duplicate emails are the
//! accepted cost of at-least-once delivery.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::database::repositories::{
    ChangeRepository, EventRepository, ParticipantRepository, UserRepository,
};
use crate::database::DatabaseService;
use crate::models::change::{ChangeEntity, ChangeOperation, ChangeRecord};
use crate::models::event::{Event, EventStatus};
use crate::models::participant::EventParticipant;
use crate::services::notification::{EmailSender, NotificationService};
use crate::utils::errors::Result;

/// What a single change record asks us to tell participants
#[derive(Debug, Clone)]
pub enum Notification {
    EventCancelled(Event),
    EventUpdated(Event),
    RegistrationConfirmed(EventParticipant),
}

enum Audience {
    Cancellation,
    Update,
}

/// Background job that consumes the change outbox
#[derive(Clone)]
pub struct ChangeDispatcher<E> {
    changes: ChangeRepository,
    events: EventRepository,
    participants: ParticipantRepository,
    users: UserRepository,
    notifier: NotificationService<E>,
    batch_size: i64,
}

impl<E: EmailSender> ChangeDispatcher<E> {
    pub fn new(db: &DatabaseService, notifier: NotificationService<E>, batch_size: i64) -> Self {
        Self {
            changes: db.changes.clone(),
            events: db.events.clone(),
            participants: db.participants.clone(),
            users: db.users.clone(),
            notifier,
            batch_size,
        }
    }

    /// Poll the outbox forever on a fixed interval
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.run_once().await {
                Ok(0) => {}
                Ok(sent) => info!(sent, "Dispatched notification emails"),
                Err(e) => error!(error = %e, "Change dispatch failed, batch will be retried"),
            }
        }
    }

    /// Process one batch of change records. Returns the number of emails sent.
    pub async fn run_once(&self) -> Result<usize> {
        let batch = self.changes.fetch_batch(self.batch_size).await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let mut sent = 0;
        for record in &batch {
            match classify(record) {
                Ok(Some(notification)) => sent += self.dispatch(notification).await?,
                Ok(None) => {}
                // A record we cannot decode would wedge the queue if we
                // errored here; drop it and keep going.
                Err(e) => warn!(seq = record.seq, error = %e, "Skipping malformed change record"),
            }
        }

        let seqs: Vec<i64> = batch.iter().map(|record| record.seq).collect();
        self.changes.delete_batch(&seqs).await?;
        Ok(sent)
    }

    async fn dispatch(&self, notification: Notification) -> Result<usize> {
        match notification {
            Notification::EventCancelled(event) => {
                self.notify_registered(&event, Audience::Cancellation).await
            }
            Notification::EventUpdated(event) => {
                self.notify_registered(&event, Audience::Update).await
            }
            Notification::RegistrationConfirmed(participant) => {
                let Some(event) = self.events.find_by_id(participant.event_id).await? else {
                    warn!(event_id = %participant.event_id, "Registration refers to a missing event");
                    return Ok(0);
                };
                let Some(profile) = self.users.find_by_id(participant.user_id).await? else {
                    warn!(user_id = %participant.user_id, "Registered participant has no profile");
                    return Ok(0);
                };
                self.notifier.send_confirmation(&event, &profile.email).await?;
                Ok(1)
            }
        }
    }

    /// Fan an event-level notification out to every registered participant
    async fn notify_registered(&self, event: &Event, audience: Audience) -> Result<usize> {
        let participants = self.participants.list_registered(event.id).await?;

        let mut sent = 0;
        for participant in &participants {
            let Some(profile) = self.users.find_by_id(participant.user_id).await? else {
                warn!(user_id = %participant.user_id, "Registered participant has no profile");
                continue;
            };
            match audience {
                Audience::Cancellation => {
                    self.notifier.send_cancellation(event, &profile.email).await?
                }
                Audience::Update => self.notifier.send_update(event, &profile.email).await?,
            }
            sent += 1;
        }

        Ok(sent)
    }
}

/// Decide which notification, if any, a change record calls for
pub fn classify(record: &ChangeRecord) -> Result<Option<Notification>> {
    if record.is(ChangeEntity::Event, ChangeOperation::Modify) {
        let new: Event = serde_json::from_value(record.new_value.clone())?;
        let Some(old_value) = &record.old_value else {
            return Ok(None);
        };
        let old: Event = serde_json::from_value(old_value.clone())?;

        let was_active = old.status == EventStatus::Active.as_str();
        if was_active && new.status == EventStatus::Cancelled.as_str() {
            return Ok(Some(Notification::EventCancelled(new)));
        }
        if was_active && new.status == EventStatus::Active.as_str() && has_material_change(&old, &new)
        {
            return Ok(Some(Notification::EventUpdated(new)));
        }
        return Ok(None);
    }

    if record.is(ChangeEntity::Participant, ChangeOperation::Insert) {
        let participant: EventParticipant = serde_json::from_value(record.new_value.clone())?;
        if participant.is_registered() {
            return Ok(Some(Notification::RegistrationConfirmed(participant)));
        }
    }

    Ok(None)
}

/// Changes worth emailing participants about. Title edits alone are not;
/// participants see those the next time they look at the event.
pub fn has_material_change(old: &Event, new: &Event) -> bool {
    old.event_date != new.event_date
        || old.event_time != new.event_time
        || old.location != new.location
        || old.description != new.description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventStatus;
    use crate::models::participant::ParticipantStatus;
    use chrono::{Duration as ChronoDuration, Utc};
    use sqlx::types::Json;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    fn event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Glacier Walk".to_string(),
            description: "Crampons provided".to_string(),
            categories: Json(vec![]),
            image_key: None,
            location: "North Face Hut".to_string(),
            event_date: now + ChronoDuration::days(14),
            event_time: "08:00".to_string(),
            max_participants: Some(10),
            status: EventStatus::Active.as_str().to_string(),
            search_text: "glacier walk crampons provided".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn record(
        entity: ChangeEntity,
        operation: ChangeOperation,
        old_value: Option<serde_json::Value>,
        new_value: serde_json::Value,
    ) -> ChangeRecord {
        ChangeRecord {
            seq: 1,
            entity: entity.as_str().to_string(),
            operation: operation.as_str().to_string(),
            old_value,
            new_value,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cancellation_classified() {
        let old = event();
        let mut new = old.clone();
        new.status = EventStatus::Cancelled.as_str().to_string();

        let record = record(
            ChangeEntity::Event,
            ChangeOperation::Modify,
            Some(serde_json::to_value(&old).unwrap()),
            serde_json::to_value(&new).unwrap(),
        );
        assert!(matches!(
            classify(&record).unwrap(),
            Some(Notification::EventCancelled(_))
        ));
    }

    #[test]
    fn test_material_update_classified() {
        let old = event();
        let mut new = old.clone();
        new.location = "South Ridge Hut".to_string();

        let record = record(
            ChangeEntity::Event,
            ChangeOperation::Modify,
            Some(serde_json::to_value(&old).unwrap()),
            serde_json::to_value(&new).unwrap(),
        );
        assert!(matches!(
            classify(&record).unwrap(),
            Some(Notification::EventUpdated(_))
        ));
    }

    #[test]
    fn test_title_only_update_ignored() {
        let old = event();
        let mut new = old.clone();
        new.title = "Glacier Walk (rescheduled soon)".to_string();

        let record = record(
            ChangeEntity::Event,
            ChangeOperation::Modify,
            Some(serde_json::to_value(&old).unwrap()),
            serde_json::to_value(&new).unwrap(),
        );
        assert!(classify(&record).unwrap().is_none());
    }

    #[test]
    fn test_completion_sweep_ignored() {
        let old = event();
        let mut new = old.clone();
        new.status = EventStatus::Completed.as_str().to_string();

        let record = record(
            ChangeEntity::Event,
            ChangeOperation::Modify,
            Some(serde_json::to_value(&old).unwrap()),
            serde_json::to_value(&new).unwrap(),
        );
        assert!(classify(&record).unwrap().is_none());
    }

    #[test]
    fn test_event_insert_ignored() {
        let new = event();
        let record = record(
            ChangeEntity::Event,
            ChangeOperation::Insert,
            None,
            serde_json::to_value(&new).unwrap(),
        );
        assert!(classify(&record).unwrap().is_none());
    }

    #[test]
    fn test_registration_insert_classified() {
        let participant = EventParticipant {
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: ParticipantStatus::Registered.as_str().to_string(),
            registered_at: Utc::now(),
        };
        let record = record(
            ChangeEntity::Participant,
            ChangeOperation::Insert,
            None,
            serde_json::to_value(&participant).unwrap(),
        );
        assert!(matches!(
            classify(&record).unwrap(),
            Some(Notification::RegistrationConfirmed(_))
        ));
    }

    #[test]
    fn test_rejoin_modify_ignored() {
        let participant = EventParticipant {
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: ParticipantStatus::Registered.as_str().to_string(),
            registered_at: Utc::now(),
        };
        let value = serde_json::to_value(&participant).unwrap();
        let record = record(
            ChangeEntity::Participant,
            ChangeOperation::Modify,
            Some(value.clone()),
            value,
        );
        assert!(classify(&record).unwrap().is_none());
    }

    #[derive(Clone, Default)]
    struct RecordingSender {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl EmailSender for RecordingSender {
        async fn send(&self, to: &str, subject: &str, _body: &str) -> crate::utils::errors::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cancellation_fan_out_uses_one_email_per_recipient() {
        let sender = RecordingSender::default();
        let notifier = NotificationService::new(sender.clone());
        let cancelled = event();

        for recipient in ["a@example.com", "b@example.com", "c@example.com"] {
            notifier.send_cancellation(&cancelled, recipient).await.unwrap();
        }

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent
            .iter()
            .all(|(_, subject)| subject == &format!("Event Cancelled: {}", cancelled.title)));
    }
}
