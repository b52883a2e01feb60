//! Opaque continuation tokens for list pagination
//!
//! A cursor carries the keyset position of the last row of a page. Clients
//! must treat the token as a black box and pass it back verbatim.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::{AppError, Result};

/// Fixed page size for event listings
pub const PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCursor {
    pub event_date: DateTime<Utc>,
    pub event_id: Uuid,
}

impl EventCursor {
    pub fn encode(&self) -> String {
        // Serializing a date + uuid pair cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| AppError::InvalidArgument("Malformed continuation token".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| AppError::InvalidArgument("Malformed continuation token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = EventCursor {
            event_date: Utc::now(),
            event_id: Uuid::new_v4(),
        };
        let token = cursor.encode();
        assert_eq!(EventCursor::decode(&token).unwrap(), cursor);
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert_matches!(
            EventCursor::decode("not a token!"),
            Err(AppError::InvalidArgument(_))
        );
        // Valid base64, garbage payload
        let token = URL_SAFE_NO_PAD.encode(b"{\"nope\":1}");
        assert_matches!(EventCursor::decode(&token), Err(AppError::InvalidArgument(_)));
    }
}
