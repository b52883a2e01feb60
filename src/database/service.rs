//! Database service layer
//!
//! Bundles the per-table repositories behind one constructor-injected handle.

use crate::database::{ChangeRepository, DatabasePool, EventRepository, ParticipantRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub participants: ParticipantRepository,
    pub users: UserRepository,
    pub changes: ChangeRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            changes: ChangeRepository::new(pool),
        }
    }
}
