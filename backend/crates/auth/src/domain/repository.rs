//! Repository and Store Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// Partial update of a user record.
///
/// The auth core may touch exactly these fields; `None` leaves a field
/// unchanged. There is no way to clear the cutoff: revocation is
/// one-way.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub hashed_password: Option<String>,
    pub tokens_valid_from_utc: Option<DateTime<Utc>>,
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email (case-insensitive)
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Apply a partial update, durably
    async fn update(&self, user_id: &UserId, update: UserUpdate) -> AuthResult<()>;

    /// Delete a user by ID
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;
}

/// Failures surfaced by the revocation store.
///
/// A timeout during a revocation write means revocation-not-confirmed;
/// callers on one-time-use paths must fail closed, never assume success.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or command failed
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),

    /// Command did not complete within the configured deadline
    #[error("revocation store operation timed out")]
    Timeout,
}

/// Revocation (blacklist) store: keyed by token ID, TTL-bounded.
///
/// `insert_if_absent` must be atomic at the store level; it is the sole
/// arbiter between concurrent refreshes presenting the same token.
#[trait_variant::make(RevocationStore: Send)]
pub trait LocalRevocationStore {
    /// Write a revocation record unless one already exists.
    /// Returns `true` if this call created the record (first writer),
    /// `false` if the token was already revoked.
    async fn insert_if_absent(
        &self,
        token_id: &str,
        reason: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Whether a revocation record exists for this token ID
    async fn contains(&self, token_id: &str) -> Result<bool, StoreError>;
}
