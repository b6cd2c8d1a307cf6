//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod rate_limit;
pub mod refresh;
pub mod revoke_all;
pub mod sign_up;
pub mod tokens;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use rate_limit::RateLimitService;
pub use refresh::RefreshTokenUseCase;
pub use revoke_all::RevokeAllTokensUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use tokens::{TokenPair, TokenService};
