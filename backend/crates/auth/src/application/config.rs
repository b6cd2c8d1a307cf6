//! Application Configuration
//!
//! Immutable configuration for the auth core, constructed once at
//! process start and passed by `Arc` into each component. Nothing in
//! the hot path reads ambient global state.

use std::time::Duration;

use platform::password::PasswordCost;
use platform::rate_limit::RateLimitConfig;
use thiserror::Error;

/// Minimum signing secret length in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT secret must be at least {MIN_JWT_SECRET_LEN} bytes")]
    SecretTooShort,
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret (at least 32 bytes)
    pub jwt_secret: Vec<u8>,
    /// `iss` claim stamped into and required from every token
    pub token_issuer: String,
    /// `aud` claim stamped into and required from every token
    pub token_audience: String,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Clock-skew leeway applied during verification
    pub leeway: Duration,
    /// Failed-login throttling (threshold + lockout window)
    pub rate_limit: RateLimitConfig,
    /// Target Argon2id cost for stored password hashes
    pub password_cost: PasswordCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            token_issuer: "postpilot".to_string(),
            token_audience: "postpilot:users".to_string(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            leeway: Duration::from_secs(10),
            rate_limit: RateLimitConfig::default(),
            password_cost: PasswordCost::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(MIN_JWT_SECRET_LEN),
            ..Default::default()
        }
    }

    /// Reject configurations that cannot be used safely
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }
        Ok(())
    }

    /// Access token lifetime in whole seconds
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_token_ttl.as_secs()
    }

    /// Refresh token lifetime in whole seconds
    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_token_ttl.as_secs()
    }
}
