//! Content Entities
//!
//! Scheduled posts and linked social accounts. Both belong to exactly
//! one user; callers may only see and touch their own records.

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::{PostId, SocialAccountId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Social platform
// ============================================================================

/// Supported social platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Twitter,
    Instagram,
}

impl Platform {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
        }
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linkedin" => Ok(Platform::LinkedIn),
            "twitter" => Ok(Platform::Twitter),
            "instagram" => Ok(Platform::Instagram),
            other => Err(AppError::bad_request(format!(
                "Unknown platform: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Post status
// ============================================================================

/// Lifecycle state of a scheduled post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Waiting for its publish time
    Scheduled,
    /// Delivered to the platform
    Published,
    /// Delivery failed
    Failed,
}

impl PostStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

impl FromStr for PostStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            other => Err(AppError::internal(format!(
                "Unknown post status in store: {other}"
            ))),
        }
    }
}

// ============================================================================
// Post
// ============================================================================

/// A scheduled post record
#[derive(Debug, Clone)]
pub struct Post {
    pub post_id: PostId,
    pub user_id: Uuid,
    pub content: String,
    pub status: PostStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post in `Scheduled` state
    pub fn new(user_id: Uuid, content: String, scheduled_at: Option<DateTime<Utc>>) -> Self {
        Self {
            post_id: PostId::new(),
            user_id,
            content,
            status: PostStatus::Scheduled,
            scheduled_at,
            published_at: None,
            created_at: Utc::now(),
        }
    }

    /// Whether `user_id` owns this record
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.user_id == *user_id
    }
}

// ============================================================================
// Social account
// ============================================================================

/// A linked social platform account.
///
/// The platform tokens are stored for the publishing pipeline and never
/// leave the server through this crate's responses.
#[derive(Debug, Clone)]
pub struct SocialAccount {
    pub account_id: SocialAccountId,
    pub user_id: Uuid,
    pub platform: Platform,
    pub platform_user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SocialAccount {
    /// Whether `user_id` owns this record
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.user_id == *user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_roundtrip() {
        for platform in [Platform::LinkedIn, Platform::Twitter, Platform::Instagram] {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [PostStatus::Scheduled, PostStatus::Published, PostStatus::Failed] {
            assert_eq!(status.as_str().parse::<PostStatus>().unwrap(), status);
        }
        assert!("draft".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_new_post_is_scheduled() {
        let user = Uuid::new_v4();
        let post = Post::new(user, "hello".to_string(), None);
        assert_eq!(post.status, PostStatus::Scheduled);
        assert!(post.published_at.is_none());
        assert!(post.is_owned_by(&user));
        assert!(!post.is_owned_by(&Uuid::new_v4()));
    }
}
