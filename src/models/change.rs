//! Change record model
//!
//! The stores append one change record per insert or modification, in the
//! same transaction as the write itself. The notification dispatcher consumes
//! the records in sequence order with at-least-once semantics.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChangeRecord {
    pub seq: i64,
    pub entity: String,
    pub operation: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEntity {
    Event,
    Participant,
}

impl ChangeEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEntity::Event => "event",
            ChangeEntity::Participant => "participant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOperation {
    Insert,
    Modify,
}

impl ChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Insert => "insert",
            ChangeOperation::Modify => "modify",
        }
    }
}

impl ChangeRecord {
    pub fn is(&self, entity: ChangeEntity, operation: ChangeOperation) -> bool {
        self.entity == entity.as_str() && self.operation == operation.as_str()
    }
}
