//! Login Use Case
//!
//! The core authentication workflow: throttle gate, credential check,
//! transparent hash upgrade, token pair issuance.
//!
//! Unknown email, wrong password and an active lockout all produce the
//! same generic `InvalidCredentials`; success is the only asymmetric
//! branch. This is what keeps account enumeration blind.

use std::sync::Arc;

use platform::password::{PasswordManager, RawPassword};

use crate::application::rate_limit::RateLimitService;
use crate::application::tokens::{TokenPair, TokenService};
use crate::domain::repository::{RevocationStore, UserRepository, UserUpdate};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use platform::rate_limit::CounterStore;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Throttle key, normally the client IP
    pub client_id: String,
}

/// Login use case
pub struct LoginUseCase<U, B, C>
where
    U: UserRepository,
    B: RevocationStore,
    C: CounterStore,
{
    users: Arc<U>,
    tokens: Arc<TokenService<B>>,
    rate_limiter: Arc<RateLimitService<C>>,
    passwords: Arc<PasswordManager>,
}

impl<U, B, C> LoginUseCase<U, B, C>
where
    U: UserRepository,
    B: RevocationStore,
    C: CounterStore,
{
    pub fn new(
        users: Arc<U>,
        tokens: Arc<TokenService<B>>,
        rate_limiter: Arc<RateLimitService<C>>,
        passwords: Arc<PasswordManager>,
    ) -> Self {
        Self {
            users,
            tokens,
            rate_limiter,
            passwords,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<TokenPair> {
        // 1. Brute-force gate. Locked clients get the same answer as a
        //    wrong password, even with correct credentials.
        if self
            .rate_limiter
            .is_auth_rate_limited(&input.client_id)
            .await
        {
            return Err(AuthError::InvalidCredentials);
        }

        // 2. Lookup by case-insensitive email. A malformed email cannot
        //    match any account, so it takes the same failure path.
        let user = match Email::new(&input.email) {
            Ok(email) => self.users.find_by_email(&email).await?,
            Err(_) => None,
        };

        // 3. Verify. "No such user" and "wrong password" both count as
        //    a failed attempt and produce the identical error.
        let password = RawPassword::new_unchecked(input.password);
        let user = match user {
            Some(user)
                if self
                    .passwords
                    .verify_password(&password, &user.hashed_password) =>
            {
                user
            }
            _ => {
                self.rate_limiter
                    .record_failed_auth_attempt(&input.client_id)
                    .await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        // 4. Success clears the failure counter.
        self.rate_limiter
            .clear_failed_auth_attempts(&input.client_id)
            .await;

        // 5. Transparent hash upgrade, best-effort: a failed persist
        //    must not fail the login.
        if let Some(new_hash) = self
            .passwords
            .upgrade_hash_if_needed(&password, &user.hashed_password)
        {
            let update = UserUpdate {
                hashed_password: Some(new_hash),
                ..Default::default()
            };
            match self.users.update(&user.user_id, update).await {
                Ok(()) => {
                    tracing::info!(user_id = %user.user_id, "Password hash upgraded to current parameters");
                }
                Err(e) => {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Failed to persist upgraded password hash");
                }
            }
        }

        // 6. Issue the pair.
        let pair = self.tokens.issue_pair(&user.user_id)?;

        tracing::info!(user_id = %user.user_id, "User logged in");
        Ok(pair)
    }
}
