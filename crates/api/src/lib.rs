//! HTTP API layer for plaza.
//!
//! This crate provides the versioned REST API:
//!
//! - **Endpoints**: categories, likes, favorites, search and users
//! - **Extractors**: gateway identity, admin checks, idempotency keys
//! - **Middleware**: identity propagation from gateway headers
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, UserContext};

use axum::Router;

/// The API router with gateway identity resolution and state applied.
pub fn app(state: AppState) -> Router {
    router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::identity_middleware,
        ))
        .with_state(state)
}
