//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Credential failures are deliberately generic: a locked-out client, an
//! unknown email and a wrong password all surface as the same
//! `InvalidCredentials`. Once a caller has proven identity, errors become
//! specific (`UserNotFound`, `NotAuthorized`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::repository::StoreError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad login: wrong password, unknown account, or rate-limited.
    /// Indistinguishable on purpose.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Malformed token, bad signature, or wrong token type
    #[error("Token is invalid or malformed")]
    InvalidToken,

    /// Token past its natural expiry
    #[error("Token has expired")]
    TokenExpired,

    /// Token present in the revocation blacklist, or issued before the
    /// user's invalidation cutoff
    #[error("This token has been revoked and can no longer be used")]
    TokenRevoked,

    /// User vanished between token issuance and use
    #[error("User not found")]
    UserNotFound,

    /// Email already registered
    #[error("A user with this email already exists")]
    EmailTaken,

    /// Authenticated but acting on another identity
    #[error("You are not authorized to perform this action")]
    NotAuthorized,

    /// Input validation error (email format, password policy)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Revocation/counter store failure, including unconfirmed revocation
    #[error("Token store error: {0}")]
    Store(#[from] StoreError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::NotAuthorized => StatusCode::FORBIDDEN,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Store(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::NotAuthorized => ErrorKind::Forbidden,
            AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::Store(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server-side failures get a generic message;
    /// their detail stays in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Store(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("An unexpected error occurred. Please try again later.")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Store(e) => {
                tracing::error!(error = %e, "Auth token store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenRevoked => {
                tracing::warn!("Revoked token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
