//! Recipe repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

/// Recipe row joined with the caller-relative membership flags
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Ingredient line of a recipe with its catalog data
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeIngredientRow {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Tag attached to a recipe
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeTagRow {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Short recipe projection used by follow listings and membership responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeSummaryRow {
    pub id: i64,
    pub author_id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Validated recipe contents written on create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecipe {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    /// (ingredient id, amount), ids unique
    pub ingredients: Vec<(i64, i32)>,
    /// Tag ids, unique
    pub tags: Vec<i64>,
}

/// Listing filters; every present field narrows the result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<Uuid>,
    /// Tag slugs; a recipe matches when it carries any of them
    pub tags: Vec<String>,
    pub favorited_by: Option<Uuid>,
    pub in_cart_of: Option<Uuid>,
}

/// Recipe repository for database operations
pub struct RecipeRepository;

impl RecipeRepository {
    /// Insert a recipe with its ingredient lines and tags in one transaction
    pub async fn create(pool: &PgPool, author_id: Uuid, input: &SaveRecipe) -> Result<i64> {
        let mut tx = pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(&input.name)
        .bind(&input.text)
        .bind(&input.image)
        .bind(input.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_relations(&mut tx, id, input).await?;
        tx.commit().await?;

        Ok(id)
    }

    /// Replace a recipe's fields, ingredient lines and tags wholesale.
    /// Returns false when the recipe does not exist.
    pub async fn update(pool: &PgPool, id: i64, input: &SaveRecipe) -> Result<bool> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE recipes
            SET name = $2, text = $3, image = $4, cooking_time = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.text)
        .bind(&input.image)
        .bind(input.cooking_time)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_relations(&mut tx, id, input).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn insert_relations(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        input: &SaveRecipe,
    ) -> Result<()> {
        let (ingredient_ids, amounts): (Vec<i64>, Vec<i32>) =
            input.ingredients.iter().copied().unzip();

        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            SELECT $1, ingredient_id, amount
            FROM UNNEST($2::bigint[], $3::int[]) AS lines (ingredient_id, amount)
            "#,
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            SELECT $1, tag_id FROM UNNEST($2::bigint[]) AS t (tag_id)
            "#,
        )
        .bind(recipe_id)
        .bind(&input.tags)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Delete a recipe; memberships and lines cascade
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Author of a recipe, if it exists
    pub async fn author_of(pool: &PgPool, id: i64) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT author_id FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|(author,)| author))
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }

    /// Load one recipe as seen by `viewer`
    pub async fn find_row(pool: &PgPool, id: i64, viewer: Option<Uuid>) -> Result<Option<RecipeRow>> {
        let mut query = Self::select_rows(viewer);
        query.push(" WHERE r.id = ").push_bind(id);

        let row = query.build_query_as::<RecipeRow>().fetch_optional(pool).await?;
        Ok(row)
    }

    /// Filtered page of recipes, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>> {
        let mut query = Self::select_rows(viewer);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query.build_query_as::<RecipeRow>().fetch_all(pool).await?;
        Ok(rows)
    }

    /// Number of recipes matching the filter
    pub async fn count(pool: &PgPool, filter: &RecipeFilter) -> Result<i64> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_filter(&mut query, filter);

        let (count,) = query.build_query_as::<(i64,)>().fetch_one(pool).await?;
        Ok(count)
    }

    fn select_rows(viewer: Option<Uuid>) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.pub_date,
                   EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = "#,
        );
        query.push_bind(viewer);
        query.push(
            r#") AS is_favorited,
                   EXISTS (SELECT 1 FROM shopping_carts c WHERE c.recipe_id = r.id AND c.user_id = "#,
        );
        query.push_bind(viewer);
        query.push(") AS is_in_shopping_cart FROM recipes r");
        query
    }

    /// Ingredient lines for the given recipes, ordered by ingredient name
    pub async fn ingredients_for(pool: &PgPool, recipe_ids: &[i64]) -> Result<Vec<RecipeIngredientRow>> {
        let rows = sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.recipe_id, i.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Tags for the given recipes, ordered by tag id
    pub async fn tags_for(pool: &PgPool, recipe_ids: &[i64]) -> Result<Vec<RecipeTagRow>> {
        let rows = sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY rt.recipe_id, t.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_summary(pool: &PgPool, id: i64) -> Result<Option<RecipeSummaryRow>> {
        let row = sqlx::query_as::<_, RecipeSummaryRow>(
            "SELECT id, author_id, name, image, cooking_time FROM recipes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Newest recipes of each author, at most `per_author` each when given
    pub async fn summaries_by_authors(
        pool: &PgPool,
        authors: &[Uuid],
        per_author: Option<i64>,
    ) -> Result<Vec<RecipeSummaryRow>> {
        let rows = sqlx::query_as::<_, RecipeSummaryRow>(
            r#"
            SELECT id, author_id, name, image, cooking_time
            FROM (
                SELECT r.id, r.author_id, r.name, r.image, r.cooking_time,
                       ROW_NUMBER() OVER (
                           PARTITION BY r.author_id ORDER BY r.pub_date DESC, r.id DESC
                       ) AS position
                FROM recipes r
                WHERE r.author_id = ANY($1)
            ) ranked
            WHERE $2::bigint IS NULL OR position <= $2
            ORDER BY author_id, position
            "#,
        )
        .bind(authors)
        .bind(per_author)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

fn push_filter(query: &mut QueryBuilder<'static, Postgres>, filter: &RecipeFilter) {
    query.push(" WHERE TRUE");

    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }
    if !filter.tags.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }
    if let Some(user) = filter.favorited_by {
        query
            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user)
            .push(")");
    }
    if let Some(user) = filter.in_cart_of {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM shopping_carts c WHERE c.recipe_id = r.id AND c.user_id = ",
            )
            .push_bind(user)
            .push(")");
    }
}
