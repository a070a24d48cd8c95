//! Search endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use plaza_common::{AppResult, Pagination};
use plaza_core::{HotKeyword, SearchInput, SearchResult};
use plaza_db::entities::search_history::{self, SearchType};
use serde::Deserialize;

use super::checked_page;
use crate::{
    extractors::{ApiJson, ApiQuery, CurrentUser, MaybeUser},
    middleware::AppState,
    response::ApiResponse,
};

/// History query.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub search_type: Option<SearchType>,
    pub limit: Option<u64>,
}

/// Hot keyword query.
#[derive(Debug, Deserialize)]
pub struct HotQuery {
    pub limit: Option<u64>,
}

/// Run a search.
async fn search(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    WithRejection(Query(page), _): ApiQuery<Pagination>,
    WithRejection(Json(input), _): ApiJson<SearchInput>,
) -> AppResult<ApiResponse<SearchResult>> {
    let page = checked_page(page)?;
    let user_id = user.map(|u| u.user_id);
    Ok(ApiResponse::ok(
        state.search_service.search(input, user_id, page).await?,
    ))
}

/// The caller's recent searches.
async fn history(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<HistoryQuery>,
) -> AppResult<ApiResponse<Vec<search_history::Model>>> {
    Ok(ApiResponse::ok(
        state
            .search_service
            .history(user.user_id, query.search_type, query.limit)
            .await?,
    ))
}

/// Popular keywords.
async fn hot(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<HotQuery>,
) -> AppResult<ApiResponse<Vec<HotKeyword>>> {
    Ok(ApiResponse::ok(state.search_service.hot(query.limit).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(search))
        .route("/history", get(history))
        .route("/hot", get(hot))
}
