//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public user projection with the caller-relative subscription flag
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_subscribed: bool,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

const RECORD_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, avatar, role, created_at, updated_at";

// $1 is the viewer id; NULL never matches, so anonymous callers see false.
const VIEW_SELECT: &str = r#"
    SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.avatar,
           EXISTS (
               SELECT 1 FROM follows f
               WHERE f.user_id = $1 AND f.following_id = u.id
           ) AS is_subscribed
    FROM users u
"#;

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<UserRecord> {
        let sql = format!(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECORD_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&input.email)
            .bind(&input.username)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Check whether a user exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }

    /// Check if username exists
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(result.0)
    }

    /// Load one user as seen by `viewer`
    pub async fn find_view(pool: &PgPool, id: Uuid, viewer: Option<Uuid>) -> Result<Option<UserView>> {
        let sql = format!("{VIEW_SELECT} WHERE u.id = $2");
        let view = sqlx::query_as::<_, UserView>(&sql)
            .bind(viewer)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(view)
    }

    /// Load several users as seen by `viewer`, in no particular order
    pub async fn find_views(pool: &PgPool, ids: &[Uuid], viewer: Option<Uuid>) -> Result<Vec<UserView>> {
        let sql = format!("{VIEW_SELECT} WHERE u.id = ANY($2)");
        let views = sqlx::query_as::<_, UserView>(&sql)
            .bind(viewer)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(views)
    }

    /// List users ordered by username
    pub async fn list_views(
        pool: &PgPool,
        viewer: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserView>> {
        let sql = format!("{VIEW_SELECT} ORDER BY u.username ASC LIMIT $2 OFFSET $3");
        let views = sqlx::query_as::<_, UserView>(&sql)
            .bind(viewer)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(views)
    }

    /// Total number of users
    pub async fn count(pool: &PgPool) -> Result<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }

    /// Set or clear the avatar reference
    pub async fn set_avatar(pool: &PgPool, id: Uuid, avatar: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET avatar = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(avatar)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored password hash
    pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
