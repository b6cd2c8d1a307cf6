//! Refresh Token Rotation Use Case
//!
//! Exchanges a refresh token for a new pair. The presented token is
//! consumed: the revocation write must be confirmed before the new
//! pair exists, otherwise two live refresh chains could grow from one
//! token.

use std::sync::Arc;

use crate::application::tokens::{TokenPair, TokenService};
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::token::TokenType;
use crate::error::{AuthError, AuthResult};

/// Refresh token rotation use case
pub struct RefreshTokenUseCase<U, B>
where
    U: UserRepository,
    B: RevocationStore,
{
    users: Arc<U>,
    tokens: Arc<TokenService<B>>,
}

impl<U, B> RefreshTokenUseCase<U, B>
where
    U: UserRepository,
    B: RevocationStore,
{
    pub fn new(users: Arc<U>, tokens: Arc<TokenService<B>>) -> Self {
        Self { users, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        // 1. Full verification: signature, expiry, type, blacklist.
        //    Errors propagate as-is.
        let claims = self.tokens.verify(refresh_token, TokenType::Refresh).await?;
        let user_id = claims.subject_id()?;

        // 2. The account may have been deleted since issuance.
        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Bulk-invalidation cutoff applies to refresh tokens too.
        if user.revokes_token_issued_at(claims.iat) {
            return Err(AuthError::TokenRevoked);
        }

        // 3. One-time use. Concurrent refreshes with the same token
        //    race on the revocation write; exactly one proceeds.
        self.tokens.consume_for_rotation(&claims).await?;

        // 4. New pair only after the old token is confirmed dead.
        let pair = self.tokens.issue_pair(&user.user_id)?;

        tracing::info!(user_id = %user.user_id, "Refresh token rotated");
        Ok(pair)
    }
}
