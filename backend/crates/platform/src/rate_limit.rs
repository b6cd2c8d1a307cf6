//! Rate Limiting Infrastructure
//!
//! Configuration and the counter-store abstraction used for
//! failed-authentication throttling.

use std::time::Duration;

use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Consecutive failures allowed before lockout
    pub max_attempts: u32,
    /// Lockout window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(300),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }
}

/// Failures surfaced by a counter store
#[derive(Debug, Error)]
pub enum CounterStoreError {
    /// Backend unreachable or command failed
    #[error("counter store unavailable: {0}")]
    Unavailable(String),

    /// Command did not complete within the configured deadline
    #[error("counter store operation timed out")]
    Timeout,
}

/// Keyed counter store with per-key TTL.
///
/// Backends must make `increment` atomic at the store level: concurrent
/// failed attempts from the same client must never lose an increment to
/// a read-modify-write race.
#[trait_variant::make(CounterStore: Send)]
pub trait LocalCounterStore {
    /// Atomically increment the counter for `key`, creating it with
    /// `ttl` when absent. The TTL is NOT refreshed on later increments:
    /// the window stays anchored to the first failure.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError>;

    /// Current counter value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError>;

    /// Delete the counter.
    async fn remove(&self, key: &str) -> Result<(), CounterStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.window_secs(), 300);
    }

    #[test]
    fn test_custom_config() {
        let config = RateLimitConfig::new(3, 60);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.window, Duration::from_secs(60));
    }
}
