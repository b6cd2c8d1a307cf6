//! Revoke All Tokens Use Case
//!
//! "Log out everywhere": moves the user's `tokens_valid_from_utc`
//! cutoff to now, invalidating every previously issued token without
//! enumerating token IDs. Tokens minted in the same second as the call
//! stay valid; the narrow window is the accepted cost of the
//! timestamp-based design.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::repository::{UserRepository, UserUpdate};
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Revoke-all-tokens use case
pub struct RevokeAllTokensUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
}

impl<U> RevokeAllTokensUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: &UserId) -> AuthResult<()> {
        let update = UserUpdate {
            tokens_valid_from_utc: Some(Utc::now()),
            ..Default::default()
        };
        self.users.update(user_id, update).await?;

        tracing::info!(user_id = %user_id, "All tokens revoked for user");
        Ok(())
    }
}
