//! Favorites and shopping cart
//!
//! One add/remove pair serves both sets; [`MembershipSet`] picks the table
//! and the wording of error messages.

use crate::db::{self, MissingReference};
use crate::error::ApiError;
use crate::repositories::{MembershipRepository, RecipeRepository, RecipeSummaryRow};
use foodgram_shared::types::RecipeSummary;
use foodgram_shared::MembershipSet;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

impl From<RecipeSummaryRow> for RecipeSummary {
    fn from(row: RecipeSummaryRow) -> Self {
        RecipeSummary {
            id: row.id,
            name: row.name,
            image: row.image,
            cooking_time: row.cooking_time,
        }
    }
}

/// Membership service for per-user recipe sets
pub struct MembershipService;

impl MembershipService {
    /// Put a recipe into the user's set and return its summary
    pub async fn add(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: i64,
        set: MembershipSet,
    ) -> Result<RecipeSummary, ApiError> {
        let recipe = RecipeRepository::find_summary(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        // The recipe may be deleted between the lookup and the insert.
        let inserted = MembershipRepository::insert(pool, set, user_id, recipe_id)
            .await
            .map_err(|e| match db::missing_reference(&e) {
                Some(MissingReference::Caller) => ApiError::Unauthorized("User not found".to_string()),
                Some(MissingReference::Target) => ApiError::NotFound("Recipe not found".to_string()),
                None => ApiError::Internal(e),
            })?;
        if !inserted {
            return Err(ApiError::Conflict(format!("Recipe is already in {}", set)));
        }

        debug!(user_id = %user_id, recipe_id, set = %set, "Recipe added");
        Ok(recipe.into())
    }

    /// Take a recipe out of the user's set
    pub async fn remove(
        pool: &PgPool,
        user_id: Uuid,
        recipe_id: i64,
        set: MembershipSet,
    ) -> Result<(), ApiError> {
        if !RecipeRepository::exists(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }

        let removed = MembershipRepository::remove(pool, set, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound(format!("Recipe is not in {}", set)));
        }

        debug!(user_id = %user_id, recipe_id, set = %set, "Recipe removed");
        Ok(())
    }
}
