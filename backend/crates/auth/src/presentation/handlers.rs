//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;

use platform::client::client_id;
use platform::password::PasswordManager;
use platform::rate_limit::CounterStore;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, RateLimitService, RefreshTokenUseCase,
    RevokeAllTokensUseCase, SignUpInput, SignUpUseCase, TokenService,
};
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, MessageResponse, SignUpRequest, TokenRefreshRequest, TokenResponse, UserResponse,
};
use crate::presentation::middleware::{CurrentUser, bearer_token};

/// Shared state for auth handlers and middleware
pub struct AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub tokens: Arc<TokenService<S>>,
    pub rate_limiter: Arc<RateLimitService<S>>,
    pub passwords: Arc<PasswordManager>,
    pub config: Arc<AuthConfig>,
}

impl<U, S> AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    /// Wire up the state from a user repository, a keyed store and the
    /// validated configuration.
    pub fn new(users: U, store: S, config: AuthConfig) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let config = Arc::new(config);
        let store = Arc::new(store);

        let tokens = Arc::new(TokenService::new(store.clone(), config.clone()));
        let rate_limiter = Arc::new(RateLimitService::new(
            store.clone(),
            config.rate_limit.clone(),
        ));
        let passwords = Arc::new(PasswordManager::new(config.password_cost)?);

        Ok(Self {
            users: Arc::new(users),
            tokens,
            rate_limiter,
            passwords,
            config,
        })
    }
}

impl<U, S> Clone for AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            tokens: self.tokens.clone(),
            rate_limiter: self.rate_limiter.clone(),
            passwords: self.passwords.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.users.clone(), state.passwords.clone());

    let user = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let client_id = client_id(&headers, Some(addr.ip()));

    let use_case = LoginUseCase::new(
        state.users.clone(),
        state.tokens.clone(),
        state.rate_limiter.clone(),
        state.passwords.clone(),
    );

    let pair = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
            client_id,
        })
        .await?;

    Ok(Json(TokenResponse::from(pair)))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /auth/refresh
pub async fn refresh<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<TokenRefreshRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let use_case = RefreshTokenUseCase::new(state.users.clone(), state.tokens.clone());

    let pair = use_case.execute(&req.refresh_token).await?;

    Ok(Json(TokenResponse::from(pair)))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /auth/logout
///
/// Requires a valid access token (protected route); the refresh token
/// to retire travels in the body.
pub async fn logout<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
    Json(req): Json<TokenRefreshRequest>,
) -> AuthResult<StatusCode>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let access_token = bearer_token(&headers).ok_or(AuthError::InvalidToken)?;

    let use_case = LogoutUseCase::new(state.tokens.clone());
    use_case.execute(&access_token, &req.refresh_token).await;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Revoke All ("log out everywhere")
// ============================================================================

/// POST /auth/revoke-all
pub async fn revoke_all<U, S>(
    State(state): State<AuthAppState<U, S>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> AuthResult<StatusCode>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    let use_case = RevokeAllTokensUseCase::new(state.users.clone());
    use_case.execute(&current.user.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Current User
// ============================================================================

/// GET /users/me
pub async fn me(axum::Extension(current): axum::Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&current.user))
}

/// DELETE /users/me
pub async fn delete_me<U, S>(
    State(state): State<AuthAppState<U, S>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> AuthResult<Json<MessageResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    S: RevocationStore + CounterStore + Send + Sync + 'static,
{
    state.users.delete(&current.user.user_id).await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
