use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A seat held by a user on an occurrence. Cancelling never deletes the
/// row; it flips `status` so the history stays auditable.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub occurrence_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reminded_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn new(user_id: String, occurrence_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            occurrence_id,
            status: "CONFIRMED".to_string(),
            created_at: now,
            cancelled_at: None,
            reminded_at: None,
        }
    }
}
