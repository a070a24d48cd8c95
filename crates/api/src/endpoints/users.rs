//! Users endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use plaza_common::{AppResult, PageData, Pagination};
use plaza_core::{UpdateProfileInput, UserListQuery, UserProfile};

use super::checked_page;
use crate::{
    extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Get current user.
async fn me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserProfile>> {
    Ok(ApiResponse::ok(
        state
            .user_service
            .get_profile(user.user_id, Some(user.user_id))
            .await?,
    ))
}

/// Update current user.
async fn update_me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    WithRejection(Json(input), _): ApiJson<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserProfile>> {
    Ok(ApiResponse::ok(
        state.user_service.update_me(user.user_id, input).await?,
    ))
}

/// Get a user by ID.
async fn show(
    MaybeUser(viewer): MaybeUser,
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> AppResult<ApiResponse<UserProfile>> {
    let viewer_id = viewer.map(|v| v.user_id);
    Ok(ApiResponse::ok(
        state.user_service.get_profile(id, viewer_id).await?,
    ))
}

/// List users.
async fn list(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<UserListQuery>,
    WithRejection(Query(page), _): ApiQuery<Pagination>,
) -> AppResult<ApiResponse<PageData<UserProfile>>> {
    let page = checked_page(page)?;
    Ok(ApiResponse::ok(state.user_service.list(&query, page).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/me", get(me).put(update_me))
        .route("/{id}", get(show))
}
