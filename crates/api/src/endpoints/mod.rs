//! API endpoints.

mod categories;
mod favorites;
mod health;
mod likes;
mod search;
mod users;

use axum::{Router, routing::get};
use plaza_common::{AppError, AppResult, Pagination};
use validator::Validate;

use crate::middleware::AppState;

/// Create the API router.
///
/// Versioned routes live under `/api/v1`; `/health` is unversioned.
pub fn router() -> Router<AppState> {
    let v1 = Router::new()
        .nest("/categories", categories::router())
        .nest("/likes", likes::router())
        .nest("/favorites", favorites::router())
        .nest("/search", search::router())
        .nest("/users", users::router());

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", v1)
}

/// Reject out-of-range page parameters.
pub(crate) fn checked_page(page: Pagination) -> AppResult<Pagination> {
    page.validate()?;
    Ok(page)
}

/// Parse a type tag taken from the path, e.g. `CONTENT`.
pub(crate) fn parse_tag<T>(raw: &str) -> AppResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(AppError::BadRequest)
}
