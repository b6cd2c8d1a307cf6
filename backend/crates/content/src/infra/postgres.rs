//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{PostId, SocialAccountId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Platform, Post, PostStatus, SocialAccount};
use crate::domain::repository::{PostRepository, SocialAccountRepository};

// ============================================================================
// Posts
// ============================================================================

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PostRepository for PgPostRepository {
    async fn create(&self, post: &Post) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                post_id,
                user_id,
                content,
                status,
                scheduled_at,
                published_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.post_id.as_uuid())
        .bind(post.user_id)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.scheduled_at)
        .bind(post.published_at)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, post_id: &PostId) -> AppResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT post_id, user_id, content, status, scheduled_at, published_at, created_at
            FROM posts
            WHERE post_id = $1
            "#,
        )
        .bind(post_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PostRow::into_post).transpose()
    }

    async fn list_by_user(&self, user_id: &Uuid) -> AppResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT post_id, user_id, content, status, scheduled_at, published_at, created_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    async fn delete(&self, post_id: &PostId) -> AppResult<()> {
        sqlx::query("DELETE FROM posts WHERE post_id = $1")
            .bind(post_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    user_id: Uuid,
    content: String,
    status: String,
    scheduled_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> AppResult<Post> {
        Ok(Post {
            post_id: PostId::from_uuid(self.post_id),
            user_id: self.user_id,
            content: self.content,
            status: self.status.parse()?,
            scheduled_at: self.scheduled_at,
            published_at: self.published_at,
            created_at: self.created_at,
        })
    }
}

// ============================================================================
// Social accounts
// ============================================================================

/// PostgreSQL-backed social account repository
#[derive(Clone)]
pub struct PgSocialAccountRepository {
    pool: PgPool,
}

impl PgSocialAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SocialAccountRepository for PgSocialAccountRepository {
    async fn find_by_id(&self, account_id: &SocialAccountId) -> AppResult<Option<SocialAccount>> {
        let row = sqlx::query_as::<_, SocialAccountRow>(
            r#"
            SELECT account_id, user_id, platform, platform_user_id,
                   access_token, refresh_token, token_expires_at, created_at
            FROM socials
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SocialAccountRow::into_account).transpose()
    }

    async fn list_by_user(&self, user_id: &Uuid) -> AppResult<Vec<SocialAccount>> {
        let rows = sqlx::query_as::<_, SocialAccountRow>(
            r#"
            SELECT account_id, user_id, platform, platform_user_id,
                   access_token, refresh_token, token_expires_at, created_at
            FROM socials
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(SocialAccountRow::into_account)
            .collect()
    }

    async fn delete(&self, account_id: &SocialAccountId) -> AppResult<()> {
        sqlx::query("DELETE FROM socials WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?;

        tracing::info!(account_id = %account_id, "Social account unlinked");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SocialAccountRow {
    account_id: Uuid,
    user_id: Uuid,
    platform: String,
    platform_user_id: String,
    access_token: String,
    refresh_token: String,
    token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SocialAccountRow {
    fn into_account(self) -> AppResult<SocialAccount> {
        let platform: Platform = self
            .platform
            .parse()
            .map_err(|_: AppError| AppError::internal("Unknown platform in store"))?;

        Ok(SocialAccount {
            account_id: SocialAccountId::from_uuid(self.account_id),
            user_id: self.user_id,
            platform,
            platform_user_id: self.platform_user_id,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_expires_at: self.token_expires_at,
            created_at: self.created_at,
        })
    }
}
