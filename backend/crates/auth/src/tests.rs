//! Unit tests for the auth crate
//!
//! Exercised end-to-end at the use-case level against the in-memory
//! store and repository implementations.

use std::sync::Arc;
use std::time::Duration;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, RateLimitService, RefreshTokenUseCase,
    RevokeAllTokensUseCase, SignUpInput, SignUpUseCase, TokenService,
};
use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, StoreError, UserRepository};
use crate::domain::token::{TokenClaims, TokenType};
use crate::domain::value_object::email::Email;
use crate::error::AuthError;
use crate::infra::memory::{InMemoryStore, InMemoryUserRepository};
use platform::password::{PasswordCost, PasswordManager, RawPassword};
use platform::rate_limit::RateLimitConfig;

const PASSWORD: &str = "SecurePass123!";

struct Harness {
    users: Arc<InMemoryUserRepository>,
    store: Arc<InMemoryStore>,
    tokens: Arc<TokenService<InMemoryStore>>,
    rate_limiter: Arc<RateLimitService<InMemoryStore>>,
    passwords: Arc<PasswordManager>,
    config: Arc<AuthConfig>,
}

fn test_config() -> AuthConfig {
    AuthConfig {
        password_cost: PasswordCost::fast_insecure(),
        leeway: Duration::from_secs(0),
        ..AuthConfig::with_random_secret()
    }
}

fn harness() -> Harness {
    harness_with_config(test_config())
}

fn harness_with_config(config: AuthConfig) -> Harness {
    let config = Arc::new(config);
    let users = Arc::new(InMemoryUserRepository::new());
    let store = Arc::new(InMemoryStore::new());
    let tokens = Arc::new(TokenService::new(store.clone(), config.clone()));
    let rate_limiter = Arc::new(RateLimitService::new(
        store.clone(),
        config.rate_limit.clone(),
    ));
    let passwords =
        Arc::new(PasswordManager::new(config.password_cost).expect("valid test cost"));

    Harness {
        users,
        store,
        tokens,
        rate_limiter,
        passwords,
        config,
    }
}

impl Harness {
    async fn seed_user(&self, email: &str) -> User {
        let hash = self
            .passwords
            .hash_password(&RawPassword::new_unchecked(PASSWORD.to_string()))
            .unwrap();
        let user = User::new(Email::new(email).unwrap(), hash);
        self.users.create(&user).await.unwrap();
        user
    }

    fn login_uc(&self) -> LoginUseCase<InMemoryUserRepository, InMemoryStore, InMemoryStore> {
        LoginUseCase::new(
            self.users.clone(),
            self.tokens.clone(),
            self.rate_limiter.clone(),
            self.passwords.clone(),
        )
    }

    fn refresh_uc(&self) -> RefreshTokenUseCase<InMemoryUserRepository, InMemoryStore> {
        RefreshTokenUseCase::new(self.users.clone(), self.tokens.clone())
    }

    fn login_input(&self, email: &str, password: &str, client: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: password.to_string(),
            client_id: client.to_string(),
        }
    }
}

// ============================================================================
// Token service
// ============================================================================

mod token_tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_both_types() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        for token_type in [TokenType::Access, TokenType::Refresh] {
            let token = h.tokens.issue(&user.user_id, token_type).unwrap();
            let claims = h.tokens.verify(&token, token_type).await.unwrap();

            assert_eq!(claims.sub, user.user_id.to_string());
            assert_eq!(claims.token_type, token_type);
            assert!(claims.exp > claims.iat);
        }
    }

    #[tokio::test]
    async fn test_wrong_type_rejected() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        let access = h.tokens.issue(&user.user_id, TokenType::Access).unwrap();
        let refresh = h.tokens.issue(&user.user_id, TokenType::Refresh).unwrap();

        assert!(matches!(
            h.tokens.verify(&access, TokenType::Refresh).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            h.tokens.verify(&refresh, TokenType::Access).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_malformed_tokens_rejected() {
        let h = harness();

        for garbage in ["", "not-a-token", "a.b", "a.b.c.d"] {
            assert!(matches!(
                h.tokens.verify(garbage, TokenType::Access).await,
                Err(AuthError::InvalidToken)
            ));
        }
    }

    #[tokio::test]
    async fn test_foreign_signature_rejected() {
        let h = harness();
        let other = harness(); // different random secret
        let user = h.seed_user("user@example.com").await;

        let token = h.tokens.issue(&user.user_id, TokenType::Access).unwrap();

        assert!(matches!(
            other.tokens.verify(&token, TokenType::Access).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        let token = h
            .tokens
            .issue_with_ttl(&user.user_id, TokenType::Access, chrono::Duration::seconds(-60))
            .unwrap();

        assert!(matches!(
            h.tokens.verify(&token, TokenType::Access).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        let token = h.tokens.issue(&user.user_id, TokenType::Access).unwrap();
        assert!(h.tokens.verify(&token, TokenType::Access).await.is_ok());

        assert!(h.tokens.revoke(&token, "test").await);

        assert!(matches!(
            h.tokens.verify(&token, TokenType::Access).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;
        let token = h.tokens.issue(&user.user_id, TokenType::Access).unwrap();

        assert!(h.tokens.revoke(&token, "first").await);
        assert!(h.tokens.revoke(&token, "second").await);
    }

    #[tokio::test]
    async fn test_revoke_expired_token_is_noop_success() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        let token = h
            .tokens
            .issue_with_ttl(&user.user_id, TokenType::Access, chrono::Duration::seconds(-60))
            .unwrap();

        // Natural expiry already blocks the token; no record is written
        assert!(h.tokens.revoke(&token, "late").await);
    }

    #[tokio::test]
    async fn test_revoke_malformed_token_fails() {
        let h = harness();
        assert!(!h.tokens.revoke("garbage", "test").await);
    }

    #[tokio::test]
    async fn test_revocation_record_ttl_matches_token_lifetime() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        let token = h
            .tokens
            .issue_with_ttl(&user.user_id, TokenType::Access, chrono::Duration::seconds(100))
            .unwrap();
        let claims = h.tokens.verify(&token, TokenType::Access).await.unwrap();

        assert!(h.tokens.revoke(&token, "test").await);

        let ttl = h.store.revocation_ttl(&claims.jti).expect("record exists");
        assert!(ttl <= Duration::from_secs(100));
        assert!(ttl > Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_consume_for_rotation_first_writer_wins() {
        let h = harness();
        let user = h.seed_user("user@example.com").await;

        let token = h.tokens.issue(&user.user_id, TokenType::Refresh).unwrap();
        let claims = h.tokens.verify(&token, TokenType::Refresh).await.unwrap();

        assert!(h.tokens.consume_for_rotation(&claims).await.is_ok());
        assert!(matches!(
            h.tokens.consume_for_rotation(&claims).await,
            Err(AuthError::TokenRevoked)
        ));
    }
}

// ============================================================================
// Rate limiting
// ============================================================================

mod rate_limit_tests {
    use super::*;

    #[tokio::test]
    async fn test_threshold() {
        let h = harness();
        let threshold = h.config.rate_limit.max_attempts;

        for _ in 0..threshold - 1 {
            h.rate_limiter.record_failed_auth_attempt("1.2.3.4").await;
        }
        assert!(!h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);

        h.rate_limiter.record_failed_auth_attempt("1.2.3.4").await;
        assert!(h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);
    }

    #[tokio::test]
    async fn test_clear_resets_counter() {
        let h = harness();

        for _ in 0..h.config.rate_limit.max_attempts {
            h.rate_limiter.record_failed_auth_attempt("1.2.3.4").await;
        }
        assert!(h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);

        h.rate_limiter.clear_failed_auth_attempts("1.2.3.4").await;
        assert!(!h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let h = harness();

        for _ in 0..h.config.rate_limit.max_attempts {
            h.rate_limiter.record_failed_auth_attempt("1.2.3.4").await;
        }

        assert!(h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);
        assert!(!h.rate_limiter.is_auth_rate_limited("5.6.7.8").await);
    }

    #[tokio::test]
    async fn test_window_expires() {
        let mut config = test_config();
        config.rate_limit = RateLimitConfig::new(2, 1);
        let h = harness_with_config(config);

        h.rate_limiter.record_failed_auth_attempt("1.2.3.4").await;
        h.rate_limiter.record_failed_auth_attempt("1.2.3.4").await;
        assert!(h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);
    }
}

// ============================================================================
// Login
// ============================================================================

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_login_returns_verifiable_pair() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;

        let pair = h
            .login_uc()
            .execute(h.login_input("a@b.com", PASSWORD, "1.2.3.4"))
            .await
            .unwrap();

        let access = h
            .tokens
            .verify(&pair.access_token, TokenType::Access)
            .await
            .unwrap();
        let refresh = h
            .tokens
            .verify(&pair.refresh_token, TokenType::Refresh)
            .await
            .unwrap();

        assert_eq!(access.sub, user.user_id.to_string());
        assert_eq!(refresh.sub, user.user_id.to_string());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let h = harness();
        h.seed_user("a@b.com").await;

        let result = h
            .login_uc()
            .execute(h.login_input("A@B.COM", PASSWORD, "1.2.3.4"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_identical() {
        let h = harness();
        h.seed_user("a@b.com").await;

        let wrong_password = h
            .login_uc()
            .execute(h.login_input("a@b.com", "WrongPass123!", "1.2.3.4"))
            .await;
        let unknown_user = h
            .login_uc()
            .execute(h.login_input("nobody@b.com", PASSWORD, "1.2.3.4"))
            .await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_lockout_after_threshold_even_with_correct_password() {
        let h = harness();
        h.seed_user("a@b.com").await;
        let uc = h.login_uc();

        for _ in 0..h.config.rate_limit.max_attempts {
            let result = uc
                .execute(h.login_input("a@b.com", "WrongPass123!", "1.2.3.4"))
                .await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        // 6th attempt with the CORRECT password is still rejected
        let result = uc
            .execute(h.login_input("a@b.com", PASSWORD, "1.2.3.4"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        // A different client is unaffected
        let result = uc
            .execute(h.login_input("a@b.com", PASSWORD, "5.6.7.8"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_lockout_window_elapses() {
        let mut config = test_config();
        config.rate_limit = RateLimitConfig::new(2, 1);
        let h = harness_with_config(config);
        h.seed_user("a@b.com").await;
        let uc = h.login_uc();

        for _ in 0..2 {
            let _ = uc
                .execute(h.login_input("a@b.com", "WrongPass123!", "1.2.3.4"))
                .await;
        }
        assert!(matches!(
            uc.execute(h.login_input("a@b.com", PASSWORD, "1.2.3.4")).await,
            Err(AuthError::InvalidCredentials)
        ));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let result = uc
            .execute(h.login_input("a@b.com", PASSWORD, "1.2.3.4"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_success_clears_prior_failures() {
        let h = harness();
        h.seed_user("a@b.com").await;
        let uc = h.login_uc();

        for _ in 0..h.config.rate_limit.max_attempts - 1 {
            let _ = uc
                .execute(h.login_input("a@b.com", "WrongPass123!", "1.2.3.4"))
                .await;
        }

        assert!(
            uc.execute(h.login_input("a@b.com", PASSWORD, "1.2.3.4"))
                .await
                .is_ok()
        );

        // Counter is gone: the client starts from zero again
        assert!(!h.rate_limiter.is_auth_rate_limited("1.2.3.4").await);
    }

    #[tokio::test]
    async fn test_weak_hash_upgraded_on_login() {
        let mut config = test_config();
        config.password_cost = PasswordCost {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        };
        let h = harness_with_config(config);

        // Seed with a hash below the configured target
        let weak_manager = PasswordManager::new(PasswordCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let weak_hash = weak_manager
            .hash_password(&RawPassword::new_unchecked(PASSWORD.to_string()))
            .unwrap();
        let user = User::new(Email::new("a@b.com").unwrap(), weak_hash.clone());
        h.users.create(&user).await.unwrap();

        let result = h
            .login_uc()
            .execute(h.login_input("a@b.com", PASSWORD, "1.2.3.4"))
            .await;
        assert!(result.is_ok());

        let stored = h
            .users
            .find_by_id(&user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.hashed_password, weak_hash);
        assert!(!h.passwords.needs_rehash(&stored.hashed_password));
    }
}

// ============================================================================
// Refresh rotation
// ============================================================================

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;
        let uc = h.refresh_uc();

        let refresh_token = h.tokens.issue(&user.user_id, TokenType::Refresh).unwrap();

        let new_pair = uc.execute(&refresh_token).await.unwrap();
        assert!(
            h.tokens
                .verify(&new_pair.refresh_token, TokenType::Refresh)
                .await
                .is_ok()
        );

        // Presenting the consumed token again must fail
        assert!(matches!(
            uc.execute(&refresh_token).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_double_refresh_exactly_one_winner() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;
        let uc = h.refresh_uc();

        let refresh_token = h.tokens.issue(&user.user_id, TokenType::Refresh).unwrap();

        let (a, b) = tokio::join!(uc.execute(&refresh_token), uc.execute(&refresh_token));

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one refresh must win");

        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(AuthError::TokenRevoked)));
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;

        let access_token = h.tokens.issue(&user.user_id, TokenType::Access).unwrap();

        assert!(matches!(
            h.refresh_uc().execute(&access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_fails() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;

        let refresh_token = h.tokens.issue(&user.user_id, TokenType::Refresh).unwrap();
        h.users.delete(&user.user_id).await.unwrap();

        assert!(matches!(
            h.refresh_uc().execute(&refresh_token).await,
            Err(AuthError::UserNotFound)
        ));
    }

    /// Store that can never confirm a revocation write
    #[derive(Clone)]
    struct BrokenStore;

    impl RevocationStore for BrokenStore {
        async fn insert_if_absent(
            &self,
            _token_id: &str,
            _reason: &str,
            _ttl: Duration,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Timeout)
        }

        async fn contains(&self, _token_id: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_unconfirmed_revocation_fails_closed() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;

        let broken_tokens = Arc::new(TokenService::new(Arc::new(BrokenStore), h.config.clone()));
        let uc = RefreshTokenUseCase::new(h.users.clone(), broken_tokens.clone());

        let refresh_token = broken_tokens
            .issue(&user.user_id, TokenType::Refresh)
            .unwrap();

        // No new pair may be issued while the old token might still live
        assert!(matches!(
            uc.execute(&refresh_token).await,
            Err(AuthError::Store(StoreError::Timeout))
        ));
    }
}

// ============================================================================
// Logout
// ============================================================================

mod logout_tests {
    use super::*;

    #[tokio::test]
    async fn test_logout_revokes_both_tokens() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;
        let pair = h.tokens.issue_pair(&user.user_id).unwrap();

        LogoutUseCase::new(h.tokens.clone())
            .execute(&pair.access_token, &pair.refresh_token)
            .await;

        assert!(matches!(
            h.tokens.verify(&pair.access_token, TokenType::Access).await,
            Err(AuthError::TokenRevoked)
        ));
        assert!(matches!(
            h.tokens
                .verify(&pair.refresh_token, TokenType::Refresh)
                .await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;
        let pair = h.tokens.issue_pair(&user.user_id).unwrap();

        let uc = LogoutUseCase::new(h.tokens.clone());
        uc.execute(&pair.access_token, &pair.refresh_token).await;
        // Second logout with the same tokens is a quiet no-op
        uc.execute(&pair.access_token, &pair.refresh_token).await;

        assert!(matches!(
            h.tokens.verify(&pair.access_token, TokenType::Access).await,
            Err(AuthError::TokenRevoked)
        ));
    }
}

// ============================================================================
// Revoke all ("log out everywhere")
// ============================================================================

mod revoke_all_tests {
    use super::*;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    /// Sign claims directly, bypassing the service, to control `iat`
    fn sign(config: &AuthConfig, claims: &TokenClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&config.jwt_secret),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_tokens_issued_before_cutoff_are_revoked() {
        let h = harness();
        let user = h.seed_user("a@b.com").await;
        let now = chrono::Utc::now();

        // A refresh token issued two minutes ago
        let old_claims = TokenClaims {
            sub: user.user_id.to_string(),
            exp: (now + chrono::Duration::days(7)).timestamp(),
            iat: (now - chrono::Duration::seconds(120)).timestamp(),
            nbf: (now - chrono::Duration::seconds(120)).timestamp(),
            iss: h.config.token_issuer.clone(),
            aud: h.config.token_audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: TokenType::Refresh,
        };
        let old_token = sign(&h.config, &old_claims);

        RevokeAllTokensUseCase::new(h.users.clone())
            .execute(&user.user_id)
            .await
            .unwrap();

        let stored = h.users.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert!(stored.tokens_valid_from_utc.is_some());

        // The pre-cutoff token dies even though it is not blacklisted
        assert!(matches!(
            h.refresh_uc().execute(&old_token).await,
            Err(AuthError::TokenRevoked)
        ));

        // A token issued after the cutoff still works
        let new_token = h.tokens.issue(&user.user_id, TokenType::Refresh).unwrap();
        assert!(h.refresh_uc().execute(&new_token).await.is_ok());
    }
}

// ============================================================================
// Sign up
// ============================================================================

mod sign_up_tests {
    use super::*;

    fn sign_up_uc(h: &Harness) -> SignUpUseCase<InMemoryUserRepository> {
        SignUpUseCase::new(h.users.clone(), h.passwords.clone())
    }

    #[tokio::test]
    async fn test_sign_up_stores_verifiable_hash() {
        let h = harness();

        let user = sign_up_uc(&h)
            .execute(SignUpInput {
                email: "New@Example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        // Email normalized, hash verifies, plaintext never stored
        assert_eq!(user.email.as_str(), "new@example.com");
        assert!(h.passwords.verify_password(
            &RawPassword::new_unchecked(PASSWORD.to_string()),
            &user.hashed_password
        ));
        assert_ne!(user.hashed_password, PASSWORD);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict() {
        let h = harness();
        let uc = sign_up_uc(&h);

        let input = || SignUpInput {
            email: "a@b.com".to_string(),
            password: PASSWORD.to_string(),
        };

        assert!(uc.execute(input()).await.is_ok());
        assert!(matches!(
            uc.execute(input()).await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let h = harness();

        let result = sign_up_uc(&h)
            .execute(SignUpInput {
                email: "a@b.com".to_string(),
                password: "weakpass".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let h = harness();

        let result = sign_up_uc(&h)
            .execute(SignUpInput {
                email: "not-an-email".to_string(),
                password: PASSWORD.to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }
}
