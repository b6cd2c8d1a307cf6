//! Redis Store Implementation
//!
//! One connection-managed client backing both keyed stores:
//! - revocation blacklist: `revoked_token:{jti}` with `SET NX EX`
//!   (atomic set-if-absent, the rotation arbiter)
//! - failed-auth counters: `failed_auth:{client}` with `INCR` and an
//!   `EXPIRE` issued only when the counter is created
//!
//! Every command runs under a deadline. A timed-out revocation write is
//! reported as unconfirmed, never assumed to have succeeded.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions};

use crate::domain::repository::{RevocationStore, StoreError};
use platform::rate_limit::{CounterStore, CounterStoreError};

/// Key prefix for revocation records
const REVOKED_TOKEN_PREFIX: &str = "revoked_token:";

/// Default per-command deadline
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed revocation blacklist and failed-auth counter store
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    command_timeout: Duration,
}

impl RedisStore {
    /// Connect and verify the server responds to PING
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        Self::connect_with_timeout(url, DEFAULT_COMMAND_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        url: &str,
        command_timeout: Duration,
    ) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Connected to Redis");

        Ok(Self {
            conn,
            command_timeout,
        })
    }

    async fn run<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

// ============================================================================
// Revocation blacklist
// ============================================================================

impl RevocationStore for RedisStore {
    async fn insert_if_absent(
        &self,
        token_id: &str,
        reason: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let key = format!("{REVOKED_TOKEN_PREFIX}{token_id}");
        let reason = reason.to_string();
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1);

        self.run(async move {
            let opts = SetOptions::default()
                .conditional_set(ExistenceCheck::NX)
                .with_expiration(SetExpiry::EX(ttl_secs));
            // NX: the write succeeds only for the first caller
            let written: Option<String> = conn.set_options(&key, reason, opts).await?;
            Ok(written.is_some())
        })
        .await
    }

    async fn contains(&self, token_id: &str) -> Result<bool, StoreError> {
        let key = format!("{REVOKED_TOKEN_PREFIX}{token_id}");
        let mut conn = self.conn.clone();

        self.run(async move {
            let exists: bool = conn.exists(&key).await?;
            Ok(exists)
        })
        .await
    }
}

// ============================================================================
// Failed-auth counters
// ============================================================================

impl CounterStore for RedisStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError> {
        let key = key.to_string();
        let mut conn = self.conn.clone();
        let window_secs = ttl.as_secs().max(1) as i64;

        self.run(async move {
            let count: u64 = conn.incr(&key, 1u64).await?;
            if count == 1 {
                // Window anchors to the first failure; later increments
                // leave the TTL alone.
                let _: bool = conn.expire(&key, window_secs).await?;
            }
            Ok(count)
        })
        .await
        .map_err(counter_err)
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        let key = key.to_string();
        let mut conn = self.conn.clone();

        self.run(async move {
            let value: Option<u64> = conn.get(&key).await?;
            Ok(value)
        })
        .await
        .map_err(counter_err)
    }

    async fn remove(&self, key: &str) -> Result<(), CounterStoreError> {
        let key = key.to_string();
        let mut conn = self.conn.clone();

        self.run(async move {
            let _: i64 = conn.del(&key).await?;
            Ok(())
        })
        .await
        .map_err(counter_err)
    }
}

fn counter_err(err: StoreError) -> CounterStoreError {
    match err {
        StoreError::Unavailable(msg) => CounterStoreError::Unavailable(msg),
        StoreError::Timeout => CounterStoreError::Timeout,
    }
}
