//! HTTP Handlers
//!
//! All routes here sit behind the auth crate's bearer middleware; the
//! authenticated caller arrives as a [`CurrentUser`] extension. Records
//! are scoped to the caller: a missing record is 404, someone else's
//! record is 403.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

use auth::middleware::CurrentUser;
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{PostId, SocialAccountId};

use crate::domain::entity::Post;
use crate::domain::repository::{PostRepository, SocialAccountRepository};
use crate::presentation::dto::{CreatePostRequest, PostResponse, SocialAccountResponse};

/// Maximum post length in characters
const MAX_POST_CONTENT_CHARS: usize = 5000;

/// Shared state for content handlers
pub struct ContentAppState<P, A>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    pub posts: Arc<P>,
    pub socials: Arc<A>,
}

impl<P, A> Clone for ContentAppState<P, A>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            posts: self.posts.clone(),
            socials: self.socials.clone(),
        }
    }
}

// ============================================================================
// Posts
// ============================================================================

/// GET /posts
pub async fn list_posts<P, A>(
    State(state): State<ContentAppState<P, A>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> AppResult<Json<Vec<PostResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    let posts = state
        .posts
        .list_by_user(current.user.user_id.as_uuid())
        .await?;

    Ok(Json(posts.iter().map(PostResponse::from).collect()))
}

/// POST /posts
pub async fn create_post<P, A>(
    State(state): State<ContentAppState<P, A>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<PostResponse>)>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::unprocessable("Post content cannot be empty"));
    }
    if content.chars().count() > MAX_POST_CONTENT_CHARS {
        return Err(AppError::unprocessable(format!(
            "Post content must be at most {MAX_POST_CONTENT_CHARS} characters"
        )));
    }

    let post = Post::new(
        *current.user.user_id.as_uuid(),
        content.to_string(),
        req.scheduled_at,
    );
    state.posts.create(&post).await?;

    tracing::info!(post_id = %post.post_id, user_id = %post.user_id, "Post scheduled");

    Ok((StatusCode::CREATED, Json(PostResponse::from(&post))))
}

/// DELETE /posts/{id}
pub async fn delete_post<P, A>(
    State(state): State<ContentAppState<P, A>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    let post_id = PostId::from_uuid(id);

    let post = state
        .posts
        .find_by_id(&post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?;

    if !post.is_owned_by(current.user.user_id.as_uuid()) {
        return Err(AppError::forbidden(
            "You are not authorized to delete this post",
        ));
    }

    state.posts.delete(&post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Social accounts
// ============================================================================

/// GET /socials
pub async fn list_socials<P, A>(
    State(state): State<ContentAppState<P, A>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> AppResult<Json<Vec<SocialAccountResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    let accounts = state
        .socials
        .list_by_user(current.user.user_id.as_uuid())
        .await?;

    Ok(Json(
        accounts.iter().map(SocialAccountResponse::from).collect(),
    ))
}

/// DELETE /socials/{id}
pub async fn unlink_social<P, A>(
    State(state): State<ContentAppState<P, A>>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode>
where
    P: PostRepository + Send + Sync + 'static,
    A: SocialAccountRepository + Send + Sync + 'static,
{
    let account_id = SocialAccountId::from_uuid(id);

    let account = state
        .socials
        .find_by_id(&account_id)
        .await?
        .ok_or_else(|| AppError::not_found("Social account not found"))?;

    if !account.is_owned_by(current.user.user_id.as_uuid()) {
        return Err(AppError::forbidden(
            "You are not authorized to unlink this account",
        ));
    }

    state.socials.delete(&account_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
