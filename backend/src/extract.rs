//! Extractors whose rejections use the API error envelope

use crate::error::ApiError;
use axum::extract::{rejection::QueryRejection, FromRequestParts};

/// `Query` that rejects with a JSON `BAD_REQUEST` body instead of plain text
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
