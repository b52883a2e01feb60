//! Data models
//!
//! Row types shared between the repositories, the services, and the API
//! responses.

pub mod change;
pub mod event;
pub mod participant;
pub mod user;

pub use change::{ChangeEntity, ChangeOperation, ChangeRecord};
pub use event::{build_search_text, CategoryTag, Event, EventDraft, EventFilter, EventPage, EventStatus};
pub use participant::{EventParticipant, ParticipantStatus};
pub use user::{CreateProfileRequest, UpdateProfileRequest, UserProfile};
