//! Request extractors.

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use axum_extra::extract::WithRejection;
use plaza_common::AppError;

use crate::middleware::{Identity, UserContext};

/// JSON body whose rejections use the API error envelope.
pub type ApiJson<T> = WithRejection<Json<T>, AppError>;

/// Query string whose rejections use the API error envelope.
pub type ApiQuery<T> = WithRejection<Query<T>, AppError>;

/// Path parameters whose rejections use the API error envelope.
pub type ApiPath<T> = WithRejection<Path<T>, AppError>;

/// Header a client may send to scope idempotent replays to one request.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

fn identity(parts: &Parts) -> Result<Option<UserContext>, AppError> {
    match parts.extensions.get::<Identity>() {
        None => Ok(None),
        Some(Identity::User(user)) => Ok(Some(user.clone())),
        Some(Identity::Malformed(raw)) => {
            Err(AppError::BadRequest(format!("Invalid user id header: {raw}")))
        }
    }
}

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity(parts)?.map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserContext>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity(parts).map(Self)
    }
}

/// Administrator extractor.
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserContext);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            Err(AppError::Forbidden("Administrator role required".to_string()))
        }
    }
}

/// Optional client idempotency key.
#[derive(Debug, Clone)]
pub struct IdempotencyKey(pub Option<String>);

impl<S> FromRequestParts<S> for IdempotencyKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(IDEMPOTENCY_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        match key {
            Some(key) if key.len() > 128 => Err(AppError::BadRequest(
                "Idempotency-Key must be at most 128 characters".to_string(),
            )),
            key => Ok(Self(key)),
        }
    }
}
