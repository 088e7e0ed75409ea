//! Paginated row browsing
//!
//! GET /data?page=&limit=

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::pagination::{effective_limit, get_page, Page};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for page requests
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Rows per page; the configured default when absent
    pub limit: Option<i64>,
}

fn default_page() -> i64 {
    1
}

/// GET /data
pub async fn get_data_page(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Page>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let limit = effective_limit(
        query.limit,
        state.settings.default_page_size,
        state.settings.max_page_size,
    );

    let page = get_page(&state.store, query.page, limit).await?;
    Ok(Json(page))
}
