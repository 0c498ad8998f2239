//! Tag and ingredient repositories
//!
//! Both tables are read-only for the API; rows are seeded by the import tool.

use anyhow::Result;
use sqlx::PgPool;

/// Tag from the database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Ingredient from the database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IngredientRecord {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Tag repository
pub struct TagRepository;

impl TagRepository {
    pub async fn list(db: &PgPool) -> Result<Vec<TagRecord>> {
        let tags = sqlx::query_as::<_, TagRecord>("SELECT id, name, slug FROM tags ORDER BY id")
            .fetch_all(db)
            .await?;

        Ok(tags)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<TagRecord>> {
        let tag = sqlx::query_as::<_, TagRecord>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(tag)
    }

    /// Ids from `ids` that have a matching row
    pub async fn existing_ids(db: &PgPool, ids: &[i64]) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Insert tags, skipping slugs that already exist; returns rows inserted
    pub async fn insert_many(db: &PgPool, tags: &[(String, String)]) -> Result<u64> {
        let (names, slugs): (Vec<String>, Vec<String>) = tags.iter().cloned().unzip();
        let result = sqlx::query(
            r#"
            INSERT INTO tags (name, slug)
            SELECT * FROM UNNEST($1::varchar[], $2::varchar[])
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(&names)
        .bind(&slugs)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Ingredient repository
pub struct IngredientRepository;

impl IngredientRepository {
    /// List ingredients, optionally restricted to a case-insensitive name prefix
    pub async fn search(db: &PgPool, prefix: Option<&str>) -> Result<Vec<IngredientRecord>> {
        let pattern = prefix.map(|p| format!("{}%", escape_like(&p.to_lowercase())));
        let ingredients = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE $1::text IS NULL OR LOWER(name) LIKE $1
            ORDER BY name ASC, measurement_unit ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(db)
        .await?;

        Ok(ingredients)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<IngredientRecord>> {
        let ingredient = sqlx::query_as::<_, IngredientRecord>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(ingredient)
    }

    /// Ids from `ids` that have a matching row
    pub async fn existing_ids(db: &PgPool, ids: &[i64]) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Insert ingredients, skipping existing (name, unit) pairs; returns rows inserted
    pub async fn insert_many(db: &PgPool, ingredients: &[(String, String)]) -> Result<u64> {
        let (names, units): (Vec<String>, Vec<String>) = ingredients.iter().cloned().unzip();
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            SELECT * FROM UNNEST($1::varchar[], $2::varchar[])
            ON CONFLICT (name, measurement_unit) DO NOTHING
            "#,
        )
        .bind(&names)
        .bind(&units)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally in LIKE
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
