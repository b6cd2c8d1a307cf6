//! Content Backend Module
//!
//! Scheduled-post records and social-account linkage for authenticated
//! users. Deliberately thin: records only. Publishing posts to the
//! platforms and the OAuth dance that links accounts happen elsewhere.
//!
//! Structure mirrors the auth crate:
//! - `domain/` - Entities and repository traits
//! - `infra/` - PostgreSQL implementations
//! - `presentation/` - DTOs, handlers, router

pub mod domain;
pub mod infra;
pub mod presentation;

pub use infra::postgres::{PgPostRepository, PgSocialAccountRepository};
pub use presentation::router::content_router;

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}
