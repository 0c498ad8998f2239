//! Recipe service
//!
//! Requests arrive as [`RecipeWriteRequest`], are checked into a
//! [`RecipeDraft`] and are answered with [`RecipeResponse`] read models.

use crate::db::{self, MissingReference};
use crate::error::ApiError;
use crate::pagination::{PageRequest, Paged};
use crate::repositories::{
    IngredientRepository, RecipeFilter, RecipeIngredientRow, RecipeRepository, RecipeRow,
    RecipeTagRow, SaveRecipe, TagRepository, UserRepository,
};
use crate::services::UserService;
use foodgram_shared::types::{
    RecipeIngredientResponse, RecipeResponse, RecipeWriteRequest, TagResponse, UserResponse,
};
use foodgram_shared::validation::{require_text, require_unique, validate_amount, validate_cooking_time};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Recipe contents that passed every check not requiring the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    recipe: SaveRecipe,
}

impl RecipeDraft {
    /// Check a write request: required text, bounds, non-empty and
    /// duplicate-free ingredients (by id) and tags
    pub fn from_request(request: RecipeWriteRequest) -> Result<Self, ApiError> {
        request.validate()?;

        require_text("name", &request.name)?;
        require_text("text", &request.text)?;
        require_text("image", &request.image)?;
        validate_cooking_time(request.cooking_time)?;

        require_unique("ingredients", request.ingredients.iter().map(|line| line.id))?;
        for line in &request.ingredients {
            validate_amount(line.amount)?;
        }
        require_unique("tags", request.tags.iter().copied())?;

        Ok(Self {
            recipe: SaveRecipe {
                name: request.name.trim().to_string(),
                text: request.text,
                image: request.image,
                cooking_time: request.cooking_time,
                ingredients: request
                    .ingredients
                    .into_iter()
                    .map(|line| (line.id, line.amount))
                    .collect(),
                tags: request.tags,
            },
        })
    }

    fn ingredient_ids(&self) -> Vec<i64> {
        self.recipe.ingredients.iter().map(|(id, _)| *id).collect()
    }

    /// Reject ingredient or tag ids that have no catalog row
    async fn check_references(&self, pool: &PgPool) -> Result<(), ApiError> {
        let wanted = self.ingredient_ids();
        let found: HashSet<i64> = IngredientRepository::existing_ids(pool, &wanted)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .collect();
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(ApiError::Validation {
                message: format!("Ingredient {} does not exist", missing),
                field: Some("ingredients".to_string()),
            });
        }

        let found: HashSet<i64> = TagRepository::existing_ids(pool, &self.recipe.tags)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .collect();
        if let Some(missing) = self.recipe.tags.iter().find(|id| !found.contains(id)) {
            return Err(ApiError::Validation {
                message: format!("Tag {} does not exist", missing),
                field: Some("tags".to_string()),
            });
        }

        Ok(())
    }

    pub fn into_inner(self) -> SaveRecipe {
        self.recipe
    }
}

/// Recipe service
pub struct RecipeService;

impl RecipeService {
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        request: RecipeWriteRequest,
    ) -> Result<RecipeResponse, ApiError> {
        let draft = RecipeDraft::from_request(request)?;
        draft.check_references(pool).await?;

        let id = RecipeRepository::create(pool, author_id, &draft.into_inner())
            .await
            .map_err(stale_reference)?;

        info!(recipe_id = id, author_id = %author_id, "Recipe created");
        Self::get(pool, id, Some(author_id)).await
    }

    /// Replace a recipe's contents; only the author or an admin may do so
    pub async fn update(
        pool: &PgPool,
        caller: Uuid,
        id: i64,
        request: RecipeWriteRequest,
    ) -> Result<RecipeResponse, ApiError> {
        Self::ensure_can_modify(pool, caller, id).await?;

        let draft = RecipeDraft::from_request(request)?;
        draft.check_references(pool).await?;

        let updated = RecipeRepository::update(pool, id, &draft.into_inner())
            .await
            .map_err(stale_reference)?;
        if !updated {
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }

        info!(recipe_id = id, caller = %caller, "Recipe updated");
        Self::get(pool, id, Some(caller)).await
    }

    pub async fn delete(pool: &PgPool, caller: Uuid, id: i64) -> Result<(), ApiError> {
        Self::ensure_can_modify(pool, caller, id).await?;

        let deleted = RecipeRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }

        info!(recipe_id = id, caller = %caller, "Recipe deleted");
        Ok(())
    }

    async fn ensure_can_modify(pool: &PgPool, caller: Uuid, id: i64) -> Result<(), ApiError> {
        let author = RecipeRepository::author_of(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        if author == caller || UserService::role(pool, caller).await?.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Only the author can change this recipe".to_string(),
            ))
        }
    }

    /// Load one recipe as seen by `viewer`
    pub async fn get(pool: &PgPool, id: i64, viewer: Option<Uuid>) -> Result<RecipeResponse, ApiError> {
        let row = RecipeRepository::find_row(pool, id, viewer)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        let mut responses = Self::assemble(pool, vec![row], viewer).await?;
        responses
            .pop()
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))
    }

    /// Filtered page of recipes, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<RecipeResponse>, ApiError> {
        let count = RecipeRepository::count(pool, filter)
            .await
            .map_err(ApiError::Internal)?;
        let rows = RecipeRepository::list(pool, filter, viewer, page.limit, page.offset())
            .await
            .map_err(ApiError::Internal)?;

        Ok(Paged {
            count,
            results: Self::assemble(pool, rows, viewer).await?,
        })
    }

    /// Attach authors, tags and ingredient lines to recipe rows, keeping row order
    async fn assemble(
        pool: &PgPool,
        rows: Vec<RecipeRow>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<RecipeResponse>, ApiError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut author_ids: Vec<Uuid> = rows.iter().map(|row| row.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<Uuid, UserResponse> =
            UserRepository::find_views(pool, &author_ids, viewer)
                .await
                .map_err(ApiError::Internal)?
                .into_iter()
                .map(|view| (view.id, UserResponse::from(view)))
                .collect();
        let mut ingredients = group_ingredients(
            RecipeRepository::ingredients_for(pool, &ids)
                .await
                .map_err(ApiError::Internal)?,
        );
        let mut tags = group_tags(
            RecipeRepository::tags_for(pool, &ids)
                .await
                .map_err(ApiError::Internal)?,
        );

        rows.into_iter()
            .map(|row| {
                let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
                    ApiError::Internal(anyhow::anyhow!(
                        "Author {} of recipe {} is missing",
                        row.author_id,
                        row.id
                    ))
                })?;
                let id = row.id;
                Ok(to_response(
                    row,
                    author,
                    tags.remove(&id).unwrap_or_default(),
                    ingredients.remove(&id).unwrap_or_default(),
                ))
            })
            .collect()
    }
}

/// A catalog row removed after [`RecipeDraft::check_references`], or an
/// author deleted mid-request, surfaces as a foreign key violation on insert
fn stale_reference(err: anyhow::Error) -> ApiError {
    match db::missing_reference(&err) {
        Some(MissingReference::Caller) => ApiError::Unauthorized("User not found".to_string()),
        Some(MissingReference::Target) => {
            ApiError::validation("Recipe refers to an ingredient or tag that no longer exists")
        }
        None => ApiError::Internal(err),
    }
}

fn group_ingredients(rows: Vec<RecipeIngredientRow>) -> HashMap<i64, Vec<RecipeIngredientResponse>> {
    let mut grouped: HashMap<i64, Vec<RecipeIngredientResponse>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id: row.id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            });
    }
    grouped
}

fn group_tags(rows: Vec<RecipeTagRow>) -> HashMap<i64, Vec<TagResponse>> {
    let mut grouped: HashMap<i64, Vec<TagResponse>> = HashMap::new();
    for row in rows {
        grouped.entry(row.recipe_id).or_default().push(TagResponse {
            id: row.id,
            name: row.name,
            slug: row.slug,
        });
    }
    grouped
}

fn to_response(
    row: RecipeRow,
    author: UserResponse,
    tags: Vec<TagResponse>,
    ingredients: Vec<RecipeIngredientResponse>,
) -> RecipeResponse {
    RecipeResponse {
        id: row.id,
        tags,
        author,
        ingredients,
        is_favorited: row.is_favorited,
        is_in_shopping_cart: row.is_in_shopping_cart,
        name: row.name,
        image: row.image,
        text: row.text,
        cooking_time: row.cooking_time,
        pub_date: row.pub_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_shared::types::RecipeIngredientWrite;

    fn request() -> RecipeWriteRequest {
        RecipeWriteRequest {
            ingredients: vec![
                RecipeIngredientWrite { id: 1, amount: 10 },
                RecipeIngredientWrite { id: 2, amount: 5 },
            ],
            tags: vec![1, 2],
            image: "recipes/images/pancakes.png".to_string(),
            name: "  Pancakes ".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
        }
    }

    fn field_of(err: ApiError) -> Option<String> {
        match err {
            ApiError::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_from_valid_request() {
        let draft = RecipeDraft::from_request(request()).unwrap().into_inner();
        assert_eq!(draft.name, "Pancakes");
        assert_eq!(draft.ingredients, vec![(1, 10), (2, 5)]);
        assert_eq!(draft.tags, vec![1, 2]);
    }

    #[test]
    fn test_draft_rejects_empty_ingredients() {
        let mut req = request();
        req.ingredients.clear();
        let err = RecipeDraft::from_request(req).unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("ingredients"));
    }

    #[test]
    fn test_draft_rejects_duplicate_ingredient_ids() {
        let mut req = request();
        req.ingredients.push(RecipeIngredientWrite { id: 1, amount: 3 });
        let err = RecipeDraft::from_request(req).unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("ingredients"));
    }

    #[test]
    fn test_draft_rejects_duplicate_tags() {
        let mut req = request();
        req.tags = vec![3, 3];
        let err = RecipeDraft::from_request(req).unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("tags"));
    }

    #[test]
    fn test_draft_rejects_empty_tags() {
        let mut req = request();
        req.tags.clear();
        let err = RecipeDraft::from_request(req).unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("tags"));
    }

    #[test]
    fn test_draft_rejects_amount_out_of_range() {
        let mut req = request();
        req.ingredients[1].amount = 0;
        let err = RecipeDraft::from_request(req).unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("amount"));
    }

    #[test]
    fn test_draft_rejects_blank_text() {
        let mut req = request();
        req.text = "   ".to_string();
        let err = RecipeDraft::from_request(req).unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("text"));
    }

    #[test]
    fn test_draft_rejects_cooking_time_out_of_range() {
        let mut req = request();
        req.cooking_time = 32_001;
        assert!(RecipeDraft::from_request(req).is_err());
    }

    #[test]
    fn test_grouping_keeps_line_order() {
        let rows = vec![
            RecipeIngredientRow {
                recipe_id: 7,
                id: 2,
                name: "Flour".to_string(),
                measurement_unit: "г".to_string(),
                amount: 200,
            },
            RecipeIngredientRow {
                recipe_id: 8,
                id: 1,
                name: "Salt".to_string(),
                measurement_unit: "г".to_string(),
                amount: 3,
            },
            RecipeIngredientRow {
                recipe_id: 7,
                id: 1,
                name: "Salt".to_string(),
                measurement_unit: "г".to_string(),
                amount: 10,
            },
        ];

        let grouped = group_ingredients(rows);
        let seven: Vec<&str> = grouped[&7].iter().map(|line| line.name.as_str()).collect();
        assert_eq!(seven, vec!["Flour", "Salt"]);
        assert_eq!(grouped[&8][0].amount, 3);
    }

    #[test]
    fn test_to_response_copies_flags() {
        let row = RecipeRow {
            id: 1,
            author_id: Uuid::new_v4(),
            name: "Soup".to_string(),
            text: "Boil.".to_string(),
            image: "soup.png".to_string(),
            cooking_time: 30,
            pub_date: Utc::now(),
            is_favorited: true,
            is_in_shopping_cart: false,
        };
        let author = UserResponse {
            id: row.author_id,
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            is_subscribed: false,
            avatar: None,
        };

        let response = to_response(row, author, Vec::new(), Vec::new());
        assert!(response.is_favorited);
        assert!(!response.is_in_shopping_cart);
        assert_eq!(response.cooking_time, 30);
    }
}
