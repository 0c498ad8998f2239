//! Page-number pagination
//!
//! List endpoints accept `page` (1-based) and `limit` query parameters and
//! answer with a [`Page`] envelope whose `next`/`previous` links repeat the
//! request path and query with only `page` replaced.

use crate::config::PaginationConfig;
use crate::error::ApiError;
use axum::http::Uri;
use foodgram_shared::Page;
use serde::Deserialize;

/// Raw `page`/`limit` query parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// Pick `page` and `limit` out of already-parsed query pairs
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ApiError> {
        let mut params = PageParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = Some(parse_number("page", value)?),
                "limit" => params.limit = Some(parse_number("limit", value)?),
                _ => {}
            }
        }
        Ok(params)
    }
}

fn parse_number(name: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be an integer", name)))
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Apply configured defaults; page is at least 1, limit within 1..=max
    pub fn new(params: PageParams, config: &PaginationConfig) -> Self {
        let max = i64::from(config.max_page_size.max(1));
        let limit = params
            .limit
            .unwrap_or_else(|| i64::from(config.page_size))
            .clamp(1, max);
        let page = params.page.unwrap_or(1).max(1);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results with the total row count
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub count: i64,
    pub results: Vec<T>,
}

impl<T> Paged<T> {
    /// Wrap into the response envelope with links relative to `uri`
    pub fn into_page(self, request: PageRequest, uri: &Uri) -> Page<T> {
        let has_next = request.page.saturating_mul(request.limit) < self.count;
        let next = has_next.then(|| page_link(uri, Some(request.page + 1)));
        let previous = (request.page > 1).then(|| {
            let target = request.page - 1;
            page_link(uri, (target > 1).then_some(target))
        });

        Page {
            count: self.count,
            next,
            previous,
            results: self.results,
        }
    }
}

/// Request path with `page` replaced; `None` drops the parameter
///
/// The query is decoded and re-encoded, so `%70age=2` counts as `page`.
fn page_link(uri: &Uri, page: Option<i64>) -> String {
    // Already accepted by the `Query` extractor, so decoding does not fail here.
    let mut pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(uri.query().unwrap_or_default()).unwrap_or_default();
    pairs.retain(|(key, _)| key != "page");
    if let Some(page) = page {
        pairs.push(("page".to_string(), page.to_string()));
    }

    match serde_urlencoded::to_string(&pairs) {
        Ok(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
        _ => uri.path().to_string(),
    }
}
