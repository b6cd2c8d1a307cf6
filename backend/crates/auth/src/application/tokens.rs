//! Token Service
//!
//! Creates, verifies and revokes signed session tokens. Per token the
//! state machine is `issued -> valid -> expired | revoked`; there is no
//! transition back. The service's only collaborator is the revocation
//! store; user-record checks (the bulk-invalidation cutoff) belong to
//! the callers that have just loaded the user.
//!
//! Verification order is cheap-to-expensive and mandatory: signature,
//! expiry, token type, then the blacklist lookup.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::repository::RevocationStore;
use crate::domain::token::{TokenClaims, TokenType};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Revocation reason recorded when a refresh token is rotated
const ROTATION_REASON: &str = "Token refreshed";

/// Access + refresh token pair handed to the caller.
///
/// Carries no server-side identity beyond what is embedded in the
/// signed claims.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token issuance, verification and revocation
pub struct TokenService<B>
where
    B: RevocationStore,
{
    blacklist: Arc<B>,
    config: Arc<AuthConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl<B> TokenService<B>
where
    B: RevocationStore,
{
    pub fn new(blacklist: Arc<B>, config: Arc<AuthConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.jwt_secret);
        let decoding_key = DecodingKey::from_secret(&config.jwt_secret);
        Self {
            blacklist,
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn default_ttl(&self, token_type: TokenType) -> ChronoDuration {
        let ttl = match token_type {
            TokenType::Access => self.config.access_token_ttl,
            TokenType::Refresh => self.config.refresh_token_ttl,
        };
        ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::hours(1))
    }

    /// Issue a token with the configured lifetime for its type
    pub fn issue(&self, subject: &UserId, token_type: TokenType) -> AuthResult<String> {
        self.issue_with_ttl(subject, token_type, self.default_ttl(token_type))
    }

    /// Issue a token with an explicit lifetime
    pub fn issue_with_ttl(
        &self,
        subject: &UserId,
        token_type: TokenType,
        ttl: ChronoDuration,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.token_issuer.clone(),
            aud: self.config.token_audience.clone(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))
    }

    /// Issue an access + refresh pair for a subject
    pub fn issue_pair(&self, subject: &UserId) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(subject, TokenType::Access)?,
            refresh_token: self.issue(subject, TokenType::Refresh)?,
        })
    }

    /// Verify a token string and return its claims.
    ///
    /// Checks, in order: signature (and issuer/audience), expiry, token
    /// type, revocation blacklist. Fails with `InvalidToken`,
    /// `TokenExpired` or `TokenRevoked` respectively; a blacklist
    /// outage fails closed as a store error.
    pub async fn verify(&self, token: &str, expected_type: TokenType) -> AuthResult<TokenClaims> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway.as_secs();
        validation.set_issuer(&[&self.config.token_issuer]);
        validation.set_audience(&[&self.config.token_audience]);

        let data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    JwtErrorKind::ImmatureSignature => AuthError::InvalidToken,
                    _ => AuthError::InvalidToken,
                }
            })?;
        let claims = data.claims;

        // A refresh token must never pass where an access token is
        // expected, and vice versa.
        if claims.token_type != expected_type {
            return Err(AuthError::InvalidToken);
        }

        if self.blacklist.contains(&claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Decode a token for revocation: the signature must hold but the
    /// token may already be expired.
    fn decode_for_revocation(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Revoke a token. Returns `true` when the token is certainly dead
    /// afterwards (record written, record already present, or already
    /// past natural expiry) and `false` when the write could not be
    /// confirmed. Callers on one-time-use paths must treat `false` as
    /// fatal.
    pub async fn revoke(&self, token: &str, reason: &str) -> bool {
        let claims = match self.decode_for_revocation(token) {
            Ok(claims) => claims,
            Err(_) => {
                tracing::debug!("Refusing to revoke a malformed token");
                return false;
            }
        };

        let ttl = claims.remaining_ttl(Utc::now());
        if ttl.is_zero() {
            // Natural expiry already blocks every use
            return true;
        }

        match self.blacklist.insert_if_absent(&claims.jti, reason, ttl).await {
            Ok(created) => {
                if created {
                    tracing::info!(jti = %claims.jti, reason, "Token revoked");
                }
                true
            }
            Err(e) => {
                tracing::error!(jti = %claims.jti, error = %e, "Failed to write revocation record");
                false
            }
        }
    }

    /// Consume a refresh token for rotation. The blacklist write is the
    /// exclusive arbiter between concurrent refreshes: the first writer
    /// wins, the loser observes the token as already revoked. A store
    /// fault means revocation-not-confirmed and fails closed.
    pub async fn consume_for_rotation(&self, claims: &TokenClaims) -> AuthResult<()> {
        let ttl = claims.remaining_ttl(Utc::now());
        if ttl.is_zero() {
            return Err(AuthError::TokenExpired);
        }

        let created = self
            .blacklist
            .insert_if_absent(&claims.jti, ROTATION_REASON, ttl)
            .await?;

        if created {
            Ok(())
        } else {
            Err(AuthError::TokenRevoked)
        }
    }
}
