//! Sign Up Use Case
//!
//! Creates a new user account: conflict check, password policy, hash,
//! persist.

use std::sync::Arc;

use platform::password::{PasswordManager, RawPassword};

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    passwords: Arc<PasswordManager>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, passwords: Arc<PasswordManager>) -> Self {
        Self { users, passwords }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        let email =
            Email::new(&input.email).map_err(|e| AuthError::Validation(e.message().to_string()))?;

        // Registration enforces the current password policy; login does
        // not, since the stored hash is the arbiter there.
        let password = RawPassword::new(input.password)?;

        if self.users.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let hashed_password = self.passwords.hash_password(&password)?;
        let user = User::new(email, hashed_password);

        self.users.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "New user registered");
        Ok(user)
    }
}
