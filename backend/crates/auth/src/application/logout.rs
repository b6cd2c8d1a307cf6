//! Logout Use Case
//!
//! Revokes the current access and refresh tokens. Best-effort per
//! token: both are attempted even if one fails, and revoking an
//! already-revoked token is a no-op success.

use std::sync::Arc;

use crate::application::tokens::TokenService;
use crate::domain::repository::RevocationStore;

/// Revocation reason recorded on logout
const LOGOUT_REASON: &str = "User logout";

/// Logout use case
pub struct LogoutUseCase<B>
where
    B: RevocationStore,
{
    tokens: Arc<TokenService<B>>,
}

impl<B> LogoutUseCase<B>
where
    B: RevocationStore,
{
    pub fn new(tokens: Arc<TokenService<B>>) -> Self {
        Self { tokens }
    }

    pub async fn execute(&self, access_token: &str, refresh_token: &str) {
        if !self.tokens.revoke(access_token, LOGOUT_REASON).await {
            tracing::warn!("Could not confirm access token revocation on logout");
        }
        if !self.tokens.revoke(refresh_token, LOGOUT_REASON).await {
            tracing::warn!("Could not confirm refresh token revocation on logout");
        }

        tracing::info!("User logged out");
    }
}
