//! Database layer
//!
//! Connection pool management, migrations, and repositories.

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{create_pool, health_check, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{ChangeRepository, EventRepository, ParticipantRepository, UserRepository};
pub use service::DatabaseService;
