use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Store-resident record of a user's single current refresh token.
///
/// Records are replaced wholesale or deleted, never mutated in place;
/// at most one exists per owner at any time.
#[derive(Debug, Clone)]
pub struct Session {
    pub owner_id: Uuid,
    /// SHA-256 hex of the refresh JWT. The raw token never touches
    /// the store.
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(owner_id: Uuid, token: &str) -> Self {
        Self {
            owner_id,
            token_hash: Self::hash_token(token),
            created_at: Utc::now(),
        }
    }

    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
