//! Category endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use plaza_common::{AppResult, PageData, Pagination};
use plaza_core::{CategoryListQuery, CategoryNode, CreateCategoryInput, UpdateCategoryInput};
use plaza_db::entities::category;
use tracing::info;

use super::checked_page;
use crate::{
    extractors::{AdminUser, ApiJson, ApiPath, ApiQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// Get a category.
async fn show(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> AppResult<ApiResponse<category::Model>> {
    Ok(ApiResponse::ok(state.category_service.get(id).await?))
}

/// List categories.
async fn list(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<CategoryListQuery>,
    WithRejection(Query(page), _): ApiQuery<Pagination>,
) -> AppResult<ApiResponse<PageData<category::Model>>> {
    let page = checked_page(page)?;
    Ok(ApiResponse::ok(
        state.category_service.list(&query, page).await?,
    ))
}

/// The category forest.
async fn tree(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<CategoryNode>>> {
    Ok(ApiResponse::ok(state.category_service.tree().await?))
}

/// Breadcrumb of a category, root first.
async fn root_path(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<category::Model>>> {
    Ok(ApiResponse::ok(state.category_service.ancestors(id).await?))
}

/// Create a category.
async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    WithRejection(Json(input), _): ApiJson<CreateCategoryInput>,
) -> AppResult<ApiResponse<category::Model>> {
    let category = state.category_service.create(input).await?;
    info!(admin_id = admin.user_id, category_id = category.id, "Admin created category");
    Ok(ApiResponse::ok(category))
}

/// Update a category.
async fn update(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<i64>,
    WithRejection(Json(input), _): ApiJson<UpdateCategoryInput>,
) -> AppResult<ApiResponse<category::Model>> {
    let category = state.category_service.update(id, input).await?;
    info!(admin_id = admin.user_id, category_id = id, "Admin updated category");
    Ok(ApiResponse::ok(category))
}

/// Delete a category.
async fn delete(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    state.category_service.delete(id).await?;
    info!(admin_id = admin.user_id, category_id = id, "Admin deleted category");
    Ok(ApiResponse::empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/tree", get(tree))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/root", get(root_path))
}
