//! Like endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use plaza_common::{AppResult, PageData, Pagination};
use plaza_core::{LikeToggleOutcome, LikerInfo, ToggleLikeInput};
use plaza_db::entities::like::{self, LikeType};
use serde::{Deserialize, Serialize};

use super::{checked_page, parse_tag};
use crate::{
    extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser, IdempotencyKey},
    middleware::AppState,
    response::ApiResponse,
};

/// Filters for the caller's likes.
#[derive(Debug, Deserialize)]
pub struct MyLikesQuery {
    pub like_type: Option<LikeType>,
}

/// Like check response.
#[derive(Serialize)]
pub struct LikeCheckResponse {
    pub liked: bool,
}

/// Flip a like.
async fn toggle(
    CurrentUser(user): CurrentUser,
    IdempotencyKey(request_id): IdempotencyKey,
    State(state): State<AppState>,
    WithRejection(Json(mut input), _): ApiJson<ToggleLikeInput>,
) -> AppResult<ApiResponse<LikeToggleOutcome>> {
    if input.user_nickname.is_none() {
        input.user_nickname = Some(user.username.clone());
    }

    let outcome = state
        .like_service
        .toggle(user.user_id, input, request_id.as_deref())
        .await?;

    let message = if outcome.liked { "Liked" } else { "Like cancelled" };
    Ok(ApiResponse::with_message(outcome, message))
}

/// The caller's active likes.
async fn mine(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<MyLikesQuery>,
    WithRejection(Query(page), _): ApiQuery<Pagination>,
) -> AppResult<ApiResponse<PageData<like::Model>>> {
    let page = checked_page(page)?;
    Ok(ApiResponse::ok(
        state
            .like_service
            .get_my_likes(user.user_id, query.like_type, page)
            .await?,
    ))
}

/// Users liking a target.
async fn likers(
    State(state): State<AppState>,
    WithRejection(Path((like_type, target_id)), _): ApiPath<(String, i64)>,
    WithRejection(Query(page), _): ApiQuery<Pagination>,
) -> AppResult<ApiResponse<PageData<LikerInfo>>> {
    let like_type: LikeType = parse_tag(&like_type)?;
    let page = checked_page(page)?;
    Ok(ApiResponse::ok(
        state
            .like_service
            .get_likers(like_type, target_id, page)
            .await?,
    ))
}

/// Whether the caller likes a target.
async fn check(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    WithRejection(Path((like_type, target_id)), _): ApiPath<(String, i64)>,
) -> AppResult<ApiResponse<LikeCheckResponse>> {
    let like_type: LikeType = parse_tag(&like_type)?;
    let liked = state
        .like_service
        .is_liked(user.user_id, like_type, target_id)
        .await?;
    Ok(ApiResponse::ok(LikeCheckResponse { liked }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/me", get(mine))
        .route("/check/{like_type}/{target_id}", get(check))
        .route("/{like_type}/{target_id}/users", get(likers))
}
