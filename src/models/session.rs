use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// A signed-in device. Tokens reference a session by id, and logging out
/// removes the record, which invalidates every token issued for it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: ObjectId,
    pub role: Role,
    pub created_at: DateTime,
}

impl Session {
    pub fn open(user_id: ObjectId, role: Role) -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            role,
            created_at: DateTime::now(),
        }
    }

    /// True once the session is older than `ttl_secs`, the token lifetime.
    pub fn is_expired(&self, ttl_secs: i64, now: DateTime) -> bool {
        now.timestamp_millis() - self.created_at.timestamp_millis() > ttl_secs.saturating_mul(1000)
    }
}
