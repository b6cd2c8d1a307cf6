//! In-Memory Store Implementations
//!
//! Process-local fallbacks implementing the same traits as Postgres and
//! Redis. Used by the test suite and usable for local development when
//! no Redis is around. TTL semantics are honored via monotonic
//! deadlines so expiry-sensitive behavior can be exercised in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::domain::entity::user::User;
use crate::domain::repository::{
    RevocationStore, StoreError, UserRepository, UserUpdate,
};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};
use platform::rate_limit::{CounterStore, CounterStoreError};

// ============================================================================
// Keyed stores (revocation + counters)
// ============================================================================

#[derive(Default)]
struct StoreInner {
    /// token_id -> (reason, expiry)
    revoked: HashMap<String, (String, Instant)>,
    /// key -> (count, expiry)
    counters: HashMap<String, (u64, Instant)>,
}

/// In-memory revocation blacklist and counter store
#[derive(Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining TTL of a revocation record, for assertions in tests
    pub fn revocation_ttl(&self, token_id: &str) -> Option<Duration> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .revoked
            .get(token_id)
            .map(|(_, expiry)| expiry.saturating_duration_since(Instant::now()))
    }
}

impl RevocationStore for InMemoryStore {
    async fn insert_if_absent(
        &self,
        token_id: &str,
        reason: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let now = Instant::now();

        match inner.revoked.get(token_id) {
            Some((_, expiry)) if *expiry > now => Ok(false),
            _ => {
                inner
                    .revoked
                    .insert(token_id.to_string(), (reason.to_string(), now + ttl));
                Ok(true)
            }
        }
    }

    async fn contains(&self, token_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let now = Instant::now();

        match inner.revoked.get(token_id) {
            Some((_, expiry)) if *expiry > now => Ok(true),
            Some(_) => {
                inner.revoked.remove(token_id);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

impl CounterStore for InMemoryStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let now = Instant::now();

        match inner.counters.get_mut(key) {
            Some((count, expiry)) if *expiry > now => {
                *count += 1;
                Ok(*count)
            }
            _ => {
                // Fresh counter: the TTL anchors here and only here
                inner.counters.insert(key.to_string(), (1, now + ttl));
                Ok(1)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let now = Instant::now();

        match inner.counters.get(key) {
            Some((count, expiry)) if *expiry > now => Ok(Some(*count)),
            Some(_) => {
                inner.counters.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), CounterStoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.counters.remove(key);
        Ok(())
    }
}

// ============================================================================
// User repository
// ============================================================================

/// In-memory user repository
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<uuid::Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.lock().expect("repo mutex poisoned");
        if users
            .values()
            .any(|u| u.email.as_str() == user.email.as_str())
        {
            return Err(AuthError::EmailTaken);
        }
        users.insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let users = self.users.lock().expect("repo mutex poisoned");
        Ok(users.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let users = self.users.lock().expect("repo mutex poisoned");
        Ok(users
            .values()
            .find(|u| u.email.as_str() == email.as_str())
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let users = self.users.lock().expect("repo mutex poisoned");
        Ok(users.values().any(|u| u.email.as_str() == email.as_str()))
    }

    async fn update(&self, user_id: &UserId, update: UserUpdate) -> AuthResult<()> {
        let mut users = self.users.lock().expect("repo mutex poisoned");
        let user = users
            .get_mut(user_id.as_uuid())
            .ok_or(AuthError::UserNotFound)?;

        if let Some(hash) = update.hashed_password {
            user.hashed_password = hash;
        }
        if let Some(cutoff) = update.tokens_valid_from_utc {
            user.tokens_valid_from_utc = Some(cutoff);
        }
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let mut users = self.users.lock().expect("repo mutex poisoned");
        users.remove(user_id.as_uuid());
        Ok(())
    }
}
