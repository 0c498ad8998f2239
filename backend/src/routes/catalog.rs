//! Tag and ingredient routes (read-only)

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::services::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use foodgram_shared::types::{IngredientResponse, IngredientSearchQuery, TagResponse};

/// Create tag routes
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/:id", get(get_tag))
}

/// Create ingredient routes
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_ingredients))
        .route("/:id", get(get_ingredient))
}

async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<TagResponse>>> {
    Ok(Json(CatalogService::list_tags(state.db()).await?))
}

async fn get_tag(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<TagResponse>> {
    Ok(Json(CatalogService::get_tag(state.db(), id).await?))
}

/// GET /api/ingredients?name=<prefix>
async fn search_ingredients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IngredientSearchQuery>,
) -> ApiResult<Json<Vec<IngredientResponse>>> {
    let ingredients = CatalogService::search_ingredients(state.db(), query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<IngredientResponse>> {
    Ok(Json(CatalogService::get_ingredient(state.db(), id).await?))
}
