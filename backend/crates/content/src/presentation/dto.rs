//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::{Post, PostStatus, SocialAccount};

// ============================================================================
// Posts
// ============================================================================

/// Schedule a new post
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    /// When to publish; `None` means "whenever the worker gets to it"
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Scheduled post response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub content: String,
    pub status: PostStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: *post.post_id.as_uuid(),
            content: post.content.clone(),
            status: post.status,
            scheduled_at: post.scheduled_at,
            published_at: post.published_at,
            created_at: post.created_at,
        }
    }
}

// ============================================================================
// Social accounts
// ============================================================================

/// Linked social account response.
///
/// The platform's access and refresh tokens deliberately never appear
/// here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAccountResponse {
    pub id: Uuid,
    pub platform: String,
    pub platform_user_id: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&SocialAccount> for SocialAccountResponse {
    fn from(account: &SocialAccount) -> Self {
        Self {
            id: *account.account_id.as_uuid(),
            platform: account.platform.as_str().to_string(),
            platform_user_id: account.platform_user_id.clone(),
            token_expires_at: account.token_expires_at,
            created_at: account.created_at,
        }
    }
}
