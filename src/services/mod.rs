//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod event;
pub mod notification;
pub mod participation;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthContext, AuthService, TokenClaims};
pub use event::EventService;
pub use notification::{EmailSender, NotificationService, SmtpEmailSender};
pub use participation::ParticipationService;
pub use user::UserService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub participation_service: ParticipationService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub notification_service: NotificationService<SmtpEmailSender>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: &DatabaseService, settings: &Settings) -> Self {
        let event_service = EventService::new(db.events.clone());
        let participation_service =
            ParticipationService::new(db.events.clone(), db.participants.clone());
        let user_service = UserService::new(db.users.clone());
        let auth_service = AuthService::new(&settings.auth);
        let notification_service =
            NotificationService::new(SmtpEmailSender::new(&settings.email));

        Self {
            event_service,
            participation_service,
            user_service,
            auth_service,
            notification_service,
        }
    }
}
