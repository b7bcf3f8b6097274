use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The identity a chat frontend knows a participant by. Rows in `users`
/// are created lazily the first time an identity books or cancels.
#[derive(Debug, Clone)]
pub struct ChatIdentity {
    pub external_id: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(identity: &ChatIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            external_id: identity.external_id.clone(),
            display_name: identity.display_name.clone(),
            created_at: now,
        }
    }
}
