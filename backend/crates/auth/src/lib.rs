//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and store traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL, Redis and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Signup/login with email + password
//! - Stateless JWT session tokens (access + refresh pair)
//! - One-time-use refresh token rotation
//! - Revocation blacklist with TTL aligned to token lifetime
//! - Bulk invalidation ("log out everywhere") via a per-user cutoff
//! - Brute-force lockout on repeated failed logins
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, transparently re-hashed when the
//!   stored parameters fall below the configured target
//! - Token verification is ordered cheap-to-expensive: signature,
//!   expiry, type, blacklist, per-user cutoff
//! - Credential failures and lockouts are indistinguishable to callers

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgUserRepository;
pub use infra::redis::RedisStore;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::token::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
