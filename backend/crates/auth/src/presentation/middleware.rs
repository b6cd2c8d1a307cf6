//! Auth Middleware
//!
//! Bearer-token authentication for protected routes. Verifies the
//! access token, loads the caller's user record, applies the
//! bulk-invalidation cutoff, and attaches [`CurrentUser`] to the
//! request.
//!
//! A valid signature whose subject no longer exists returns 404, not a
//! generic 401: the caller already proved identity, so the response may
//! be specific.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use platform::rate_limit::CounterStore;

use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::token::TokenType;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// The authenticated caller, stored in request extensions
#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Middleware requiring a valid access token
pub async fn require_access_token<U, S>(
    State(state): State<AuthAppState<U, S>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let token = bearer_token(req.headers())
        .ok_or_else(|| AuthError::InvalidToken.into_response())?;

    // Signature, expiry, type, blacklist
    let claims = state
        .tokens
        .verify(&token, TokenType::Access)
        .await
        .map_err(|e| e.into_response())?;

    let user_id = claims.subject_id().map_err(|e| e.into_response())?;

    let user = state
        .users
        .find_by_id(&user_id)
        .await
        .map_err(|e| e.into_response())?
        .ok_or_else(|| AuthError::UserNotFound.into_response())?;

    // Bulk-invalidation cutoff: anything issued before it is dead
    if user.revokes_token_issued_at(claims.iat) {
        return Err(AuthError::TokenRevoked.into_response());
    }

    req.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(req).await)
}
