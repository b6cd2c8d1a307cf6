//! Failed-Authentication Throttling
//!
//! Tracks consecutive failed login attempts per client identifier with
//! a sliding lockout window anchored at the first failure.
//!
//! Counter-store outages fail open here: an unreachable counter backend
//! must not lock every client out of login. The token blacklist is the
//! opposite (fail closed); the asymmetry is deliberate.

use std::sync::Arc;

use platform::rate_limit::{CounterStore, RateLimitConfig};

/// Key prefix for failed-attempt counters
const FAILED_AUTH_PREFIX: &str = "failed_auth:";

/// Per-client failed-login throttle over a keyed counter store
pub struct RateLimitService<C>
where
    C: CounterStore,
{
    counters: Arc<C>,
    config: RateLimitConfig,
}

impl<C> RateLimitService<C>
where
    C: CounterStore,
{
    pub fn new(counters: Arc<C>, config: RateLimitConfig) -> Self {
        Self { counters, config }
    }

    fn key(client_id: &str) -> String {
        format!("{FAILED_AUTH_PREFIX}{client_id}")
    }

    /// Whether this client has reached the failure threshold within the
    /// current window.
    pub async fn is_auth_rate_limited(&self, client_id: &str) -> bool {
        match self.counters.get(&Self::key(client_id)).await {
            Ok(Some(count)) => count >= u64::from(self.config.max_attempts),
            Ok(None) => false,
            Err(e) => {
                tracing::error!(error = %e, client_id, "Failed-auth counter read failed");
                false
            }
        }
    }

    /// Record one failed attempt. The window TTL is set when the
    /// counter is created and is NOT extended by later failures.
    pub async fn record_failed_auth_attempt(&self, client_id: &str) {
        match self
            .counters
            .increment(&Self::key(client_id), self.config.window)
            .await
        {
            Ok(count) => {
                if count >= u64::from(self.config.max_attempts) {
                    tracing::warn!(client_id, failures = count, "Client locked out");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, client_id, "Failed to record auth attempt");
            }
        }
    }

    /// Drop the counter. Called only after a successful authentication.
    pub async fn clear_failed_auth_attempts(&self, client_id: &str) {
        if let Err(e) = self.counters.remove(&Self::key(client_id)).await {
            tracing::error!(error = %e, client_id, "Failed to clear auth attempts");
        }
    }
}
