//! Favorite endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use plaza_common::{AppResult, PageData, Pagination};
use plaza_core::{FavoriteListQuery, FavoriteToggleOutcome, ToggleFavoriteInput};
use plaza_db::entities::favorite::{self, FavoriteType};
use serde::Serialize;

use super::{checked_page, parse_tag};
use crate::{
    extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser, IdempotencyKey},
    middleware::AppState,
    response::ApiResponse,
};

/// Favorite check response.
#[derive(Serialize)]
pub struct FavoriteCheckResponse {
    pub favorited: bool,
}

/// Flip a favorite.
async fn toggle(
    CurrentUser(user): CurrentUser,
    IdempotencyKey(request_id): IdempotencyKey,
    State(state): State<AppState>,
    WithRejection(Json(mut input), _): ApiJson<ToggleFavoriteInput>,
) -> AppResult<ApiResponse<FavoriteToggleOutcome>> {
    if input.user_nickname.is_none() {
        input.user_nickname = Some(user.username.clone());
    }

    let outcome = state
        .favorite_service
        .toggle(user.user_id, input, request_id.as_deref())
        .await?;

    let message = if outcome.favorited {
        "Favorited"
    } else {
        "Favorite cancelled"
    };
    Ok(ApiResponse::with_message(outcome, message))
}

/// The caller's favorites.
async fn list(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<FavoriteListQuery>,
    WithRejection(Query(page), _): ApiQuery<Pagination>,
) -> AppResult<ApiResponse<PageData<favorite::Model>>> {
    let page = checked_page(page)?;
    Ok(ApiResponse::ok(
        state
            .favorite_service
            .list(user.user_id, &query, page)
            .await?,
    ))
}

/// Whether the caller favorites a target.
async fn check(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    WithRejection(Path((favorite_type, target_id)), _): ApiPath<(String, i64)>,
) -> AppResult<ApiResponse<FavoriteCheckResponse>> {
    let favorite_type: FavoriteType = parse_tag(&favorite_type)?;
    let favorited = state
        .favorite_service
        .is_favorited(user.user_id, favorite_type, target_id)
        .await?;
    Ok(ApiResponse::ok(FavoriteCheckResponse { favorited }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/toggle", post(toggle))
        .route("/check/{favorite_type}/{target_id}", get(check))
}
