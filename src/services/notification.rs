//! Notification service implementation
//!
//! Email rendering and delivery for event updates, cancellations, and
//! registration confirmations. Delivery goes through the [`EmailSender`]
//! trait so jobs and tests can inject doubles.

use std::future::Future;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, error};

use crate::config::EmailConfig;
use crate::models::event::Event;
use crate::utils::errors::{AppError, Result};

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

/// Narrow delivery contract: (recipient, subject, body) in, success or
/// failure out. No delivery-receipt tracking.
pub trait EmailSender: Clone + Send + Sync + 'static {
    fn send(&self, to: &str, subject: &str, body: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Notification service for rendering and sending event emails
#[derive(Clone)]
pub struct NotificationService<E> {
    sender: E,
}

impl<E: EmailSender> NotificationService<E> {
    /// Create a new NotificationService instance
    pub fn new(sender: E) -> Self {
        Self { sender }
    }

    pub async fn send_cancellation(&self, event: &Event, to: &str) -> Result<()> {
        let message = cancellation_email(event);
        self.deliver(to, &message).await
    }

    pub async fn send_update(&self, event: &Event, to: &str) -> Result<()> {
        let message = update_email(event);
        self.deliver(to, &message).await
    }

    pub async fn send_confirmation(&self, event: &Event, to: &str) -> Result<()> {
        let message = confirmation_email(event);
        self.deliver(to, &message).await
    }

    async fn deliver(&self, to: &str, message: &EmailMessage) -> Result<()> {
        match self.sender.send(to, &message.subject, &message.body).await {
            Ok(()) => {
                debug!(recipient = to, subject = %message.subject, "Notification email sent");
                Ok(())
            }
            Err(e) => {
                error!(recipient = to, subject = %message.subject, error = %e, "Failed to send notification email");
                Err(e)
            }
        }
    }
}

/// Email sent to registered participants when an event's details change
pub fn update_email(event: &Event) -> EmailMessage {
    EmailMessage {
        subject: format!("Event Update: {}", event.title),
        body: format!(
            "The event \"{}\" has been updated.\n\n\
             Date: {}\n\
             Time: {}\n\
             Location: {}\n\n\
             Description:\n{}\n\n\
             You can view the full event details by logging into your account.\n",
            event.title,
            event.event_date.format("%Y-%m-%d"),
            event.event_time,
            event.location,
            event.description,
        ),
    }
}

/// Email sent to registered participants when an event is cancelled
pub fn cancellation_email(event: &Event) -> EmailMessage {
    EmailMessage {
        subject: format!("Event Cancelled: {}", event.title),
        body: format!(
            "Unfortunately, the event \"{}\" scheduled for {} has been cancelled.\n\n\
             If you have any questions, please contact the event organizer.\n",
            event.title,
            event.event_date.format("%Y-%m-%d"),
        ),
    }
}

/// Email sent to a participant right after a successful registration
pub fn confirmation_email(event: &Event) -> EmailMessage {
    EmailMessage {
        subject: format!("Registration Confirmed: {}", event.title),
        body: format!(
            "You're registered for \"{}\"!\n\n\
             Event Details:\n\
             Date: {}\n\
             Time: {}\n\
             Location: {}\n\n\
             Important Information:\n{}\n\n\
             You can view the full event details and participant list by logging into your account.\n",
            event.title,
            event.event_date.format("%Y-%m-%d"),
            event.event_time,
            event.location,
            event.description,
        ),
    }
}

/// SMTP email sender backed by lettre
#[derive(Clone)]
pub struct SmtpEmailSender {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpEmailSender {
    /// Create a new SMTP sender from the email configuration
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            smtp_server: config.smtp_server.clone(),
            smtp_port: config.smtp_port,
            credentials: Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    /// A fresh transport per message avoids stale pooled connections.
    fn build_transport(&self) -> Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| AppError::Email(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build();
        Ok(transport)
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| AppError::Email(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Email(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Email(format!("Failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map(|_| ())
                .map_err(|e| AppError::Email(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| AppError::Email(format!("Email task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventStatus;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn event() -> Event {
        let date = Utc.with_ymd_and_hms(2026, 9, 12, 0, 0, 0).unwrap();
        Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Summit Push".to_string(),
            description: "Pre-dawn start, bring headlamps".to_string(),
            categories: Json(vec![]),
            image_key: None,
            location: "High Col".to_string(),
            event_date: date,
            event_time: "04:30".to_string(),
            max_participants: Some(8),
            status: EventStatus::Active.as_str().to_string(),
            search_text: "summit push pre-dawn start, bring headlamps".to_string(),
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_cancellation_email() {
        let message = cancellation_email(&event());
        assert_eq!(message.subject, "Event Cancelled: Summit Push");
        assert!(message.body.contains("2026-09-12"));
        assert!(message.body.contains("has been cancelled"));
    }

    #[test]
    fn test_update_email() {
        let message = update_email(&event());
        assert_eq!(message.subject, "Event Update: Summit Push");
        assert!(message.body.contains("Time: 04:30"));
        assert!(message.body.contains("Location: High Col"));
    }

    #[test]
    fn test_confirmation_email() {
        let message = confirmation_email(&event());
        assert_eq!(message.subject, "Registration Confirmed: Summit Push");
        assert!(message.body.contains("You're registered for \"Summit Push\"!"));
        assert!(message.body.contains("bring headlamps"));
    }
}
