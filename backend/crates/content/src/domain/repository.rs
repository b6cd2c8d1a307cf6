//! Repository Traits

use kernel::error::app_error::AppResult;
use kernel::id::{PostId, SocialAccountId};
use uuid::Uuid;

use crate::domain::entity::{Post, SocialAccount};

/// Scheduled-post repository trait
#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Persist a new post
    async fn create(&self, post: &Post) -> AppResult<()>;

    /// Find a post by ID
    async fn find_by_id(&self, post_id: &PostId) -> AppResult<Option<Post>>;

    /// All posts belonging to a user, newest first
    async fn list_by_user(&self, user_id: &Uuid) -> AppResult<Vec<Post>>;

    /// Delete a post by ID
    async fn delete(&self, post_id: &PostId) -> AppResult<()>;
}

/// Social-account repository trait
#[trait_variant::make(SocialAccountRepository: Send)]
pub trait LocalSocialAccountRepository {
    /// Find a linked account by ID
    async fn find_by_id(&self, account_id: &SocialAccountId) -> AppResult<Option<SocialAccount>>;

    /// All linked accounts belonging to a user
    async fn list_by_user(&self, user_id: &Uuid) -> AppResult<Vec<SocialAccount>>;

    /// Remove a linked account
    async fn delete(&self, account_id: &SocialAccountId) -> AppResult<()>;
}
