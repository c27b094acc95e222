use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issued token pair, stored as SHA-256 digests.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserToken {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub access_token_hash: String,
    pub access_expires_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub refresh_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserToken {
    pub fn is_access_valid(&self, now: DateTime<Utc>) -> bool {
        self.access_expires_at > now
    }

    pub fn is_refresh_valid(&self, now: DateTime<Utc>) -> bool {
        self.refresh_expires_at > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}
