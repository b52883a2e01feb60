//! Repository modules
//!
//! One repository per table, each owning the SQL for its rows.

pub mod change;
pub mod event;
pub mod participant;
pub mod user;

pub use change::ChangeRepository;
pub use event::EventRepository;
pub use participant::ParticipantRepository;
pub use user::UserRepository;
