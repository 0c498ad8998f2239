//! User, avatar and subscription routes

use crate::auth::{viewer_id, AuthUser};
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::pagination::{PageParams, PageRequest};
use crate::services::{FollowService, UserService};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use foodgram_shared::types::{
    AvatarRequest, AvatarResponse, FollowResponse, Page, SetPasswordRequest, UserResponse,
};
use serde::Deserialize;
use uuid::Uuid;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me))
        .route("/me/avatar", put(set_avatar).delete(delete_avatar))
        .route("/set_password", post(set_password))
        .route("/subscriptions", get(subscriptions))
        .route("/:id", get(get_user))
        .route("/:id/subscribe", post(subscribe).delete(unsubscribe))
}

/// Query of the subscription endpoints
#[derive(Debug, Default, Deserialize)]
struct SubscriptionQuery {
    page: Option<i64>,
    limit: Option<i64>,
    /// Maximum recipes embedded per author
    recipes_limit: Option<i64>,
}

impl SubscriptionQuery {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    fn recipes_limit(&self) -> Option<i64> {
        self.recipes_limit.map(|limit| limit.max(0))
    }
}

/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    ApiQuery(params): ApiQuery<PageParams>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<UserResponse>>> {
    let page = PageRequest::new(params, &state.config().pagination);
    let users = UserService::list_users(state.db(), viewer_id(auth), page).await?;
    Ok(Json(users.into_page(page, &uri)))
}

/// GET /api/users/me
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get_user(state.db(), auth.user_id, Some(auth.user_id)).await?;
    Ok(Json(user))
}

/// GET /api/users/:id
async fn get_user(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get_user(state.db(), id, viewer_id(auth)).await?;
    Ok(Json(user))
}

/// PUT /api/users/me/avatar
async fn set_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AvatarRequest>,
) -> ApiResult<Json<AvatarResponse>> {
    let avatar = UserService::set_avatar(state.db(), auth.user_id, Some(req.avatar)).await?;
    Ok(Json(AvatarResponse { avatar }))
}

/// DELETE /api/users/me/avatar
async fn delete_avatar(State(state): State<AppState>, auth: AuthUser) -> ApiResult<StatusCode> {
    UserService::set_avatar(state.db(), auth.user_id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/set_password
async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    UserService::set_password(state.db(), auth.user_id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions
async fn subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Page<FollowResponse>>> {
    let page = PageRequest::new(query.page_params(), &state.config().pagination);
    let follows =
        FollowService::followings(state.db(), auth.user_id, page, query.recipes_limit()).await?;
    Ok(Json(follows.into_page(page, &uri)))
}

/// POST /api/users/:id/subscribe
async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
) -> ApiResult<(StatusCode, Json<FollowResponse>)> {
    let follow = FollowService::follow(state.db(), auth.user_id, id, query.recipes_limit()).await?;
    Ok((StatusCode::CREATED, Json(follow)))
}

/// DELETE /api/users/:id/subscribe
async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    FollowService::unfollow(state.db(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
