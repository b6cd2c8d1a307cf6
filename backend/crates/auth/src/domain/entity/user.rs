//! User Entity
//!
//! The durable account record. The auth core reads it and writes exactly
//! two fields through the repository: `hashed_password` (transparent
//! upgrade) and `tokens_valid_from_utc` (bulk invalidation cutoff).

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, user_id::UserId};

/// User account entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, stored lowercased
    pub email: Email,
    /// Argon2id PHC hash
    pub hashed_password: String,
    /// Any token issued strictly before this instant is invalid
    pub tokens_valid_from_utc: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh random ID
    pub fn new(email: Email, hashed_password: String) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            hashed_password,
            tokens_valid_from_utc: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a token issued at `issued_at_ts` (Unix seconds) predates
    /// the bulk-invalidation cutoff. Tokens issued in the same second as
    /// the cutoff remain valid; that skew is the accepted cost of
    /// timestamp-based invalidation.
    pub fn revokes_token_issued_at(&self, issued_at_ts: i64) -> bool {
        match self.tokens_valid_from_utc {
            Some(cutoff) => issued_at_ts < cutoff.timestamp(),
            None => false,
        }
    }
}
