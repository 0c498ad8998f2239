//! Short link redirect, served outside the `/api` prefix

use crate::error::ApiResult;
use crate::services::ShortLinkService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// GET /s/:hash
///
/// Answers `302 Found`; axum's `Redirect` helpers only produce 303, 307 and 308.
pub async fn redirect(State(state): State<AppState>, Path(hash): Path<String>) -> ApiResult<Response> {
    let url = ShortLinkService::redirect(state.db(), &hash).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
