//! Password Hashing and Verification
//!
//! Argon2id-based credential handling with:
//! - Self-describing PHC hashes (algorithm + cost parameters embedded)
//! - Zeroization of plaintext material
//! - Constant-time verification
//! - Transparent detection of hashes produced with weaker parameters
//!
//! Verification never fails with an error: a malformed stored hash is
//! treated as a mismatch. Upgrade detection is only meaningful after a
//! successful verification and never acts as an authentication decision
//! on its own.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in Unicode code points
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in Unicode code points
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains control characters
    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    /// Password is missing a required character class
    #[error("Password must contain an uppercase letter, a lowercase letter, a digit and a symbol")]
    MissingCharacterClass,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Configured cost parameters are out of range
    #[error("Invalid Argon2 cost parameters: {0}")]
    InvalidCost(String),
}

// ============================================================================
// Raw Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization.
///
/// Input is NFKC-normalized before validation so visually identical
/// passwords typed on different platforms compare equal. The value is
/// erased from memory on drop and never appears in Debug output.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RawPassword(String);

impl RawPassword {
    /// Create a raw password, enforcing the account password policy:
    /// length bounds, no control characters, and at least one uppercase
    /// letter, lowercase letter, digit and symbol.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Count code points, not bytes
        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized.chars().any(|ch| ch.is_control()) {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        let has_upper = normalized.chars().any(|c| c.is_uppercase());
        let has_lower = normalized.chars().any(|c| c.is_lowercase());
        let has_digit = normalized.chars().any(|c| c.is_ascii_digit());
        let has_symbol = normalized.chars().any(|c| !c.is_alphanumeric());

        if !(has_upper && has_lower && has_digit && has_symbol) {
            return Err(PasswordPolicyError::MissingCharacterClass);
        }

        Ok(Self(normalized))
    }

    /// Wrap an already-validated password (login input: the stored hash
    /// is the arbiter, not the current policy).
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Cost Parameters
// ============================================================================

/// Target Argon2id cost parameters.
///
/// Stored hashes produced with anything below these values are flagged
/// for transparent re-hashing on the next successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations (time cost)
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        // ~50 MiB, t=2, p=2
        Self {
            memory_kib: 51200,
            iterations: 2,
            parallelism: 2,
        }
    }
}

impl PasswordCost {
    /// Low-cost parameters for tests (hashing at production cost makes
    /// test suites crawl).
    pub fn fast_insecure() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

// ============================================================================
// Password Manager
// ============================================================================

/// Hashing, verification and upgrade detection for credential secrets.
///
/// ## Examples
/// ```rust
/// use platform::password::{PasswordCost, PasswordManager, RawPassword};
///
/// let manager = PasswordManager::new(PasswordCost::fast_insecure()).unwrap();
/// let password = RawPassword::new("MySecure#Pass2024!".to_string()).unwrap();
/// let hash = manager.hash_password(&password).unwrap();
/// assert!(manager.verify_password(&password, &hash));
/// ```
pub struct PasswordManager {
    argon2: Argon2<'static>,
    cost: PasswordCost,
}

impl PasswordManager {
    /// Build a manager targeting the given cost parameters.
    pub fn new(cost: PasswordCost) -> Result<Self, PasswordHashError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidCost(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    /// Hash a password into a PHC-format string with a fresh random salt.
    pub fn hash_password(&self, password: &RawPassword) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// Comparison is constant-time inside Argon2. A malformed stored
    /// hash returns `false` rather than an error.
    pub fn verify_password(&self, password: &RawPassword, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Whether a stored hash was produced below the target cost.
    ///
    /// True when the algorithm is not Argon2id, the hash is unparseable,
    /// or any embedded cost parameter is lower than the configured
    /// target.
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(h) => h,
            Err(_) => return true,
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        let params = match Params::try_from(&parsed) {
            Ok(p) => p,
            Err(_) => return true,
        };

        params.m_cost() < self.cost.memory_kib
            || params.t_cost() < self.cost.iterations
            || params.p_cost() < self.cost.parallelism
    }

    /// Verify and transparently re-hash with stronger parameters when
    /// needed. Returns `Some(new_hash)` only when verification succeeds
    /// AND the stored hash is below the target cost; the caller persists
    /// the new hash.
    pub fn upgrade_hash_if_needed(
        &self,
        password: &RawPassword,
        stored_hash: &str,
    ) -> Option<String> {
        if !self.verify_password(password, stored_hash) {
            return None;
        }
        if !self.needs_rehash(stored_hash) {
            return None;
        }
        self.hash_password(password).ok()
    }
}

// ============================================================================
// Tests
// ============================================================================
