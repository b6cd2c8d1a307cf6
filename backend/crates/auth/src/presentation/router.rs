//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use platform::rate_limit::CounterStore;

use crate::domain::repository::{RevocationStore, UserRepository};
use crate::infra::postgres::PgUserRepository;
use crate::infra::redis::RedisStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_access_token;

/// Create the auth router for the production repository and store
pub fn auth_router(state: AuthAppState<PgUserRepository, RedisStore>) -> Router {
    auth_router_generic(state)
}

/// Create the auth router for any repository/store implementation
pub fn auth_router_generic<U, S>(state: AuthAppState<U, S>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/auth/logout", post(handlers::logout::<U, S>))
        .route("/auth/revoke-all", post(handlers::revoke_all::<U, S>))
        .route(
            "/users/me",
            get(handlers::me).delete(handlers::delete_me::<U, S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token::<U, S>,
        ));

    Router::new()
        .route("/auth/signup", post(handlers::sign_up::<U, S>))
        .route("/auth/login", post(handlers::login::<U, S>))
        .route("/auth/refresh", post(handlers::refresh::<U, S>))
        .merge(protected)
        .with_state(state)
}
