//! Short link repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Stored short link
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShortLinkRecord {
    pub id: i64,
    pub hash: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Short link repository
pub struct ShortLinkRepository;

impl ShortLinkRepository {
    pub async fn find_by_url(pool: &PgPool, url: &str) -> Result<Option<ShortLinkRecord>> {
        let link = sqlx::query_as::<_, ShortLinkRecord>(
            "SELECT id, hash, url, created_at FROM short_links WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(pool)
        .await?;

        Ok(link)
    }

    pub async fn find_by_hash(pool: &PgPool, hash: &str) -> Result<Option<ShortLinkRecord>> {
        let link = sqlx::query_as::<_, ShortLinkRecord>(
            "SELECT id, hash, url, created_at FROM short_links WHERE hash = $1",
        )
        .bind(hash)
        .fetch_optional(pool)
        .await?;

        Ok(link)
    }

    /// Insert a mapping; None when either the hash or the url is already taken
    pub async fn try_insert(pool: &PgPool, hash: &str, url: &str) -> Result<Option<ShortLinkRecord>> {
        let link = sqlx::query_as::<_, ShortLinkRecord>(
            r#"
            INSERT INTO short_links (hash, url)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING id, hash, url, created_at
            "#,
        )
        .bind(hash)
        .bind(url)
        .fetch_optional(pool)
        .await?;

        Ok(link)
    }
}
