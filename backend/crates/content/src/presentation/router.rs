//! Content Router

use axum::{
    Router, middleware,
    routing::{delete, get},
};
use sqlx::PgPool;
use std::sync::Arc;

use auth::handlers::AuthAppState;
use auth::middleware::require_access_token;
use auth::{PgUserRepository, RedisStore};

use crate::infra::postgres::{PgPostRepository, PgSocialAccountRepository};
use crate::presentation::handlers::{self, ContentAppState};

/// Create the content router. Every route requires a valid access
/// token; the auth state drives the bearer middleware.
pub fn content_router(pool: PgPool, auth_state: AuthAppState<PgUserRepository, RedisStore>) -> Router {
    let state = ContentAppState {
        posts: Arc::new(PgPostRepository::new(pool.clone())),
        socials: Arc::new(PgSocialAccountRepository::new(pool)),
    };

    type P = PgPostRepository;
    type A = PgSocialAccountRepository;

    Router::new()
        .route(
            "/posts",
            get(handlers::list_posts::<P, A>).post(handlers::create_post::<P, A>),
        )
        .route("/posts/{id}", delete(handlers::delete_post::<P, A>))
        .route("/socials", get(handlers::list_socials::<P, A>))
        .route("/socials/{id}", delete(handlers::unlink_social::<P, A>))
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            require_access_token::<PgUserRepository, RedisStore>,
        ))
        .with_state(state)
}
