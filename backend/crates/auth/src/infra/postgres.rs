//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{UserRepository, UserUpdate};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                hashed_password,
                tokens_valid_from_utc,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.hashed_password)
        .bind(user.tokens_valid_from_utc)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                email,
                hashed_password,
                tokens_valid_from_utc,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        // Email values are lowercased at the boundary; LOWER() on the
        // column keeps the match case-insensitive for legacy rows.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                email,
                hashed_password,
                tokens_valid_from_utc,
                created_at,
                updated_at
            FROM users
            WHERE LOWER(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user_id: &UserId, update: UserUpdate) -> AuthResult<()> {
        // COALESCE keeps unspecified fields intact; neither updatable
        // field can be set back to NULL, which matches the domain (no
        // un-revoke, no hash removal).
        sqlx::query(
            r#"
            UPDATE users SET
                hashed_password = COALESCE($2, hashed_password),
                tokens_valid_from_utc = COALESCE($3, tokens_valid_from_utc),
                updated_at = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(update.hashed_password)
        .bind(update.tokens_valid_from_utc)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user_id, "User deleted");
        Ok(())
    }
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    hashed_password: String,
    tokens_valid_from_utc: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            hashed_password: self.hashed_password,
            tokens_valid_from_utc: self.tokens_valid_from_utc,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
