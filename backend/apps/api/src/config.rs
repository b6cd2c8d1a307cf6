//! Process Configuration
//!
//! Loaded once from the environment at startup; immutable afterwards.
//! Components receive their slice of this by `Arc`, never by reading
//! env vars on a hot path.

use std::env;
use std::time::Duration;

use anyhow::Context;
use auth::AuthConfig;
use platform::rate_limit::RateLimitConfig;

/// Default HTTP port
const DEFAULT_PORT: u16 = 8000;

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    /// Comma-separated list of allowed CORS origins
    pub frontend_origins: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `REDIS_URL`, `JWT_SECRET`.
    /// Everything else has production-ready defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let redis_url = env::var("REDIS_URL").context("REDIS_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let access_minutes = env_u64("ACCESS_TOKEN_EXPIRE_MINUTES", 15)?;
        let refresh_days = env_u64("REFRESH_TOKEN_EXPIRE_DAYS", 7)?;
        let max_attempts = env_u64("AUTH_MAX_FAILED_ATTEMPTS", 5)?;
        let lockout_secs = env_u64("AUTH_LOCKOUT_SECONDS", 300)?;

        let auth = AuthConfig {
            jwt_secret: jwt_secret.into_bytes(),
            access_token_ttl: Duration::from_secs(access_minutes * 60),
            refresh_token_ttl: Duration::from_secs(refresh_days * 24 * 3600),
            rate_limit: RateLimitConfig::new(max_attempts as u32, lockout_secs),
            ..Default::default()
        };
        auth.validate()?;

        let port = env_u64("PORT", u64::from(DEFAULT_PORT))? as u16;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

        Ok(Self {
            database_url,
            redis_url,
            port,
            frontend_origins,
            auth,
        })
    }
}

fn env_u64(name: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{name} must be an integer, got '{value}'")),
        Err(_) => Ok(default),
    }
}
