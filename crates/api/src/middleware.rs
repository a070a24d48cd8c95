//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use plaza_common::config::GatewayConfig;
use plaza_core::{CategoryService, FavoriteService, LikeService, SearchService, UserService};
use plaza_db::entities::user::UserRole;
use sea_orm::ActiveEnum;
use serde::Serialize;
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub category_service: CategoryService,
    pub like_service: LikeService,
    pub favorite_service: FavoriteService,
    pub search_service: SearchService,
    pub user_service: UserService,
    pub gateway: GatewayConfig,
}

/// Caller identity forwarded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserContext {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl UserContext {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Outcome of reading the gateway headers, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(UserContext),
    /// The user id header was present but not a number.
    Malformed(String),
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Read the caller identity from gateway headers.
///
/// Returns `None` when no user id header is sent. Username defaults to
/// `user_{id}` and unknown roles fall back to `user`.
#[must_use]
pub fn identity_from_headers(headers: &HeaderMap, gateway: &GatewayConfig) -> Option<Identity> {
    let raw_id = header_str(headers, &gateway.user_id_header)?;

    let Ok(user_id) = raw_id.parse::<i64>() else {
        return Some(Identity::Malformed(raw_id.to_string()));
    };

    let username = header_str(headers, &gateway.username_header)
        .map_or_else(|| format!("user_{user_id}"), str::to_string);

    let role = header_str(headers, &gateway.role_header)
        .and_then(|r| UserRole::try_from_value(&r.to_ascii_lowercase()).ok())
        .unwrap_or(UserRole::User);

    Some(Identity::User(UserContext {
        user_id,
        username,
        role,
    }))
}

/// Identity middleware. Trusts the gateway and never rejects on its own;
/// extractors decide whether a route needs a user.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(identity) = identity_from_headers(req.headers(), &state.gateway) {
        debug!(identity = ?identity, "Gateway identity");
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}
