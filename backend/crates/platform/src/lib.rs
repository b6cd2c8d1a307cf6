//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing lifecycle (Argon2id: hash, verify, upgrade)
//! - Cryptographic utilities (random bytes, Base64, constant-time compare)
//! - Client identification from HTTP headers
//! - Rate limiting configuration and counter-store abstraction

pub mod client;
pub mod crypto;
pub mod password;
pub mod rate_limit;
