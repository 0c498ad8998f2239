//! Subscriptions between users

use crate::db::{self, MissingReference};
use crate::error::ApiError;
use crate::pagination::{PageRequest, Paged};
use crate::repositories::{FollowRepository, FollowingRow, RecipeFilter, RecipeRepository, UserRepository};
use foodgram_shared::types::{FollowResponse, RecipeSummary, UserResponse};
use foodgram_shared::ValidationError;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Follow service
pub struct FollowService;

impl FollowService {
    /// Subscribe `user_id` to `author_id` and return the author's follow projection
    pub async fn follow(
        pool: &PgPool,
        user_id: Uuid,
        author_id: Uuid,
        recipes_limit: Option<i64>,
    ) -> Result<FollowResponse, ApiError> {
        if user_id == author_id {
            return Err(ValidationError::SelfFollow.into());
        }

        let author = UserRepository::find_view(pool, author_id, Some(user_id))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        // Either account may be deleted between the lookup and the insert.
        let inserted = FollowRepository::insert(pool, user_id, author_id)
            .await
            .map_err(|e| match db::missing_reference(&e) {
                Some(MissingReference::Caller) => ApiError::Unauthorized("User not found".to_string()),
                Some(MissingReference::Target) => ApiError::NotFound("User not found".to_string()),
                None => ApiError::Internal(e),
            })?;
        if !inserted {
            return Err(ApiError::Conflict(
                "You are already subscribed to this user".to_string(),
            ));
        }

        info!(user_id = %user_id, author_id = %author_id, "Subscribed");

        let filter = RecipeFilter {
            author: Some(author_id),
            ..RecipeFilter::default()
        };
        let recipes_count = RecipeRepository::count(pool, &filter)
            .await
            .map_err(ApiError::Internal)?;
        let recipes = RecipeRepository::summaries_by_authors(pool, &[author_id], recipes_limit)
            .await
            .map_err(ApiError::Internal)?;

        let mut user = UserResponse::from(author);
        user.is_subscribed = true;
        Ok(FollowResponse {
            user,
            recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
            recipes_count,
        })
    }

    pub async fn unfollow(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<(), ApiError> {
        if !UserRepository::exists(pool, author_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let removed = FollowRepository::remove(pool, user_id, author_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound(
                "You are not subscribed to this user".to_string(),
            ));
        }

        info!(user_id = %user_id, author_id = %author_id, "Unsubscribed");
        Ok(())
    }

    /// Authors the user follows, ordered by username, with their newest recipes
    pub async fn followings(
        pool: &PgPool,
        user_id: Uuid,
        page: PageRequest,
        recipes_limit: Option<i64>,
    ) -> Result<Paged<FollowResponse>, ApiError> {
        let count = FollowRepository::count_followings(pool, user_id)
            .await
            .map_err(ApiError::Internal)?;
        let rows = FollowRepository::list_followings(pool, user_id, page.limit, page.offset())
            .await
            .map_err(ApiError::Internal)?;

        let authors: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut recipes: HashMap<Uuid, Vec<RecipeSummary>> = HashMap::new();
        if !authors.is_empty() {
            for summary in RecipeRepository::summaries_by_authors(pool, &authors, recipes_limit)
                .await
                .map_err(ApiError::Internal)?
            {
                recipes
                    .entry(summary.author_id)
                    .or_default()
                    .push(summary.into());
            }
        }

        let results = rows
            .into_iter()
            .map(|row| {
                let author_recipes = recipes.remove(&row.id).unwrap_or_default();
                to_follow_response(row, author_recipes)
            })
            .collect();

        Ok(Paged { count, results })
    }
}

fn to_follow_response(row: FollowingRow, recipes: Vec<RecipeSummary>) -> FollowResponse {
    FollowResponse {
        user: UserResponse {
            id: row.id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            is_subscribed: true,
            avatar: row.avatar,
        },
        recipes,
        recipes_count: row.recipes_count,
    }
}
