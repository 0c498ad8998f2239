//! Follow (subscription) repository

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Followed author with their recipe count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FollowingRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub recipes_count: i64,
}

/// Follow repository
pub struct FollowRepository;

impl FollowRepository {
    /// Record that `user_id` follows `author_id`; false when already following
    pub async fn insert(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO follows (user_id, following_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, following_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await?;

        Ok(inserted.is_some())
    }

    pub async fn remove(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND following_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Authors followed by `user_id`, ordered by username
    pub async fn list_followings(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FollowingRow>> {
        let rows = sqlx::query_as::<_, FollowingRow>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.avatar,
                   (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.user_id = $1
            ORDER BY u.username ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_followings(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }
}
