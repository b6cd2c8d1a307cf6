//! Token Types and Claims
//!
//! A token is the session: a signed, immutable, self-contained claim
//! set. The server stores nothing per token except revocation records
//! keyed by `jti`. Lifecycle: issued -> valid -> expired or revoked,
//! with no way back.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// The two kinds of token the system issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived, authorizes individual API calls
    Access,
    /// Long-lived, one-time-use, exchanged for a new pair
    Refresh,
}

impl TokenType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Claims embedded in every signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user ID as a string
    pub sub: String,
    /// Expiry, Unix seconds
    pub exp: i64,
    /// Issued at, Unix seconds
    pub iat: i64,
    /// Not valid before, Unix seconds
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Unique token ID, the revocation key
    pub jti: String,
    /// Token kind; a refresh token is never accepted where an access
    /// token is expected, and vice versa
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl TokenClaims {
    /// Parse the subject into a typed user ID
    pub fn subject_id(&self) -> AuthResult<UserId> {
        let uuid = self
            .sub
            .parse::<uuid::Uuid>()
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(UserId::from_uuid(uuid))
    }

    /// Issuance instant
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Natural expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Seconds until natural expiry, saturating at zero.
    ///
    /// A revocation record must live exactly this long: long enough to
    /// block every remaining use, never longer than the token itself.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.exp - now.timestamp();
        if remaining <= 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(remaining as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> TokenClaims {
        TokenClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            exp,
            iat,
            nbf: iat,
            iss: "test".to_string(),
            aud: "test:users".to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
        }
    }

    #[test]
    fn test_token_type_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenType::Access).unwrap(),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&TokenType::Refresh).unwrap(),
            "\"refresh\""
        );
        let t: TokenType = serde_json::from_str("\"refresh\"").unwrap();
        assert_eq!(t, TokenType::Refresh);
    }

    #[test]
    fn test_subject_id_roundtrip() {
        let c = claims(1000, 2000);
        assert!(c.subject_id().is_ok());

        let mut bad = claims(1000, 2000);
        bad.sub = "not-a-uuid".to_string();
        assert!(matches!(bad.subject_id(), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_remaining_ttl() {
        let now = Utc::now();
        let c = claims(now.timestamp(), now.timestamp() + 120);
        assert_eq!(c.remaining_ttl(now), Duration::from_secs(120));

        let expired = claims(now.timestamp() - 200, now.timestamp() - 100);
        assert_eq!(expired.remaining_ttl(now), Duration::ZERO);
    }

    #[test]
    fn test_claims_json_shape() {
        let c = claims(1000, 2000);
        let json = serde_json::to_value(&c).unwrap();
        // The wire field is "type", not "token_type"
        assert_eq!(json["type"], "access");
        assert!(json.get("token_type").is_none());
    }
}
