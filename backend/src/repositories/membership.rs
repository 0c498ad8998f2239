//! Favorites and shopping cart repository
//!
//! Both sets share one shape: a unique (user, recipe) pair per row.

use anyhow::Result;
use foodgram_shared::{CartLine, MembershipSet};
use sqlx::PgPool;
use uuid::Uuid;

fn table(set: MembershipSet) -> &'static str {
    match set {
        MembershipSet::Favorites => "favorites",
        MembershipSet::ShoppingCart => "shopping_carts",
    }
}

/// Ingredient total for one (name, unit) group of a user's cart
#[derive(Debug, Clone, sqlx::FromRow)]
struct CartTotalRow {
    name: String,
    measurement_unit: String,
    amount: i64,
}

/// Membership repository for favorites and shopping carts
pub struct MembershipRepository;

impl MembershipRepository {
    /// Add a recipe to the set; false when the pair was already present
    pub async fn insert(pool: &PgPool, set: MembershipSet, user_id: Uuid, recipe_id: i64) -> Result<bool> {
        let sql = format!(
            r#"
            INSERT INTO {} (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            RETURNING id
            "#,
            table(set)
        );
        let inserted: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_optional(pool)
            .await?;

        Ok(inserted.is_some())
    }

    /// Remove a recipe from the set; false when it was not present
    pub async fn remove(pool: &PgPool, set: MembershipSet, user_id: Uuid, recipe_id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2", table(set));
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ingredient amounts across every recipe in the user's cart, summed per
    /// (name, unit). Ordering is left to the caller.
    pub async fn cart_totals(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartTotalRow>(
            r#"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::bigint AS amount
            FROM shopping_carts c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            GROUP BY i.name, i.measurement_unit
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLine::new(row.name, row.measurement_unit, row.amount))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_set_has_its_own_table() {
        assert_eq!(table(MembershipSet::Favorites), "favorites");
        assert_eq!(table(MembershipSet::ShoppingCart), "shopping_carts");
    }
}
