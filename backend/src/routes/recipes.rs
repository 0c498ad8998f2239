//! Recipe routes: CRUD, favorites, shopping cart and short links

use crate::auth::{viewer_id, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::pagination::{PageParams, PageRequest};
use crate::repositories::RecipeFilter;
use crate::services::{
    MembershipService, RecipeService, ShoppingListFormat, ShoppingListService, ShortLinkService,
};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use foodgram_shared::types::{
    Page, RecipeResponse, RecipeSummary, RecipeWriteRequest, ShortLinkResponse,
};
use foodgram_shared::MembershipSet;
use serde::Deserialize;
use uuid::Uuid;

/// Create recipe routes
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/:id/favorite", post(add_favorite).delete(remove_favorite))
        .route(
            "/:id/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
        .route("/:id/get-link", get(get_link))
}

/// Parsed recipe listing query
#[derive(Debug, Default, PartialEq)]
struct RecipeListQuery {
    page: PageParams,
    filter: RecipeFilter,
}

impl RecipeListQuery {
    /// Build filters from raw pairs so `tags` may repeat. Membership flags
    /// only apply to an authenticated viewer.
    fn from_pairs(pairs: &[(String, String)], viewer: Option<Uuid>) -> Result<Self, ApiError> {
        let mut filter = RecipeFilter::default();
        for (key, value) in pairs {
            match key.as_str() {
                "author" => {
                    let author = Uuid::parse_str(value).map_err(|_| ApiError::Validation {
                        message: format!("Invalid author id: {}", value),
                        field: Some("author".to_string()),
                    })?;
                    filter.author = Some(author);
                }
                "tags" if !value.is_empty() => filter.tags.push(value.clone()),
                "is_favorited" if is_truthy(value) => filter.favorited_by = viewer,
                "is_in_shopping_cart" if is_truthy(value) => filter.in_cart_of = viewer,
                _ => {}
            }
        }

        Ok(Self {
            page: PageParams::from_pairs(pairs)?,
            filter,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

/// GET /api/recipes
async fn list_recipes(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<RecipeResponse>>> {
    let viewer = viewer_id(auth);
    let query = RecipeListQuery::from_pairs(&pairs, viewer)?;
    let page = PageRequest::new(query.page, &state.config().pagination);

    let recipes = RecipeService::list(state.db(), &query.filter, viewer, page).await?;
    Ok(Json(recipes.into_page(page, &uri)))
}

/// POST /api/recipes
async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RecipeWriteRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    let recipe = RecipeService::create(state.db(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// GET /api/recipes/:id
async fn get_recipe(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = RecipeService::get(state.db(), id, viewer_id(auth)).await?;
    Ok(Json(recipe))
}

/// PATCH /api/recipes/:id
async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<RecipeWriteRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = RecipeService::update(state.db(), auth.user_id, id, req).await?;
    Ok(Json(recipe))
}

/// DELETE /api/recipes/:id
async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    RecipeService::delete(state.db(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    add_member(&state, auth, id, MembershipSet::Favorites).await
}

async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove_member(&state, auth, id, MembershipSet::Favorites).await
}

async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    add_member(&state, auth, id, MembershipSet::ShoppingCart).await
}

async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove_member(&state, auth, id, MembershipSet::ShoppingCart).await
}

async fn add_member(
    state: &AppState,
    auth: AuthUser,
    recipe_id: i64,
    set: MembershipSet,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    let summary = MembershipService::add(state.db(), auth.user_id, recipe_id, set).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn remove_member(
    state: &AppState,
    auth: AuthUser,
    recipe_id: i64,
    set: MembershipSet,
) -> ApiResult<StatusCode> {
    MembershipService::remove(state.db(), auth.user_id, recipe_id, set).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    format: Option<String>,
}

/// GET /api/recipes/download_shopping_cart
///
/// Plain text by default, CSV with `?format=csv`.
async fn download_shopping_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<DownloadQuery>,
) -> ApiResult<Response> {
    let format = ShoppingListFormat::from_query(query.format.as_deref())?;
    let list = ShoppingListService::build(state.db(), auth.user_id).await?;
    let body = ShoppingListService::render(&list, format)?;

    let disposition = format!("attachment; filename=\"{}\"", format.filename());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/recipes/:id/get-link
async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ShortLinkResponse>> {
    let link = ShortLinkService::recipe_link(
        state.db(),
        state.short_urls(),
        state.config().public_base_url(),
        id,
    )
    .await?;
    Ok(Json(link))
}
