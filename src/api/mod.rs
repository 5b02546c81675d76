//! In-memory items API for local development and integration tests.
//!
//! Serves the same contract the client expects from the hosted API:
//! `GET /api/items` and `PUT /api/items`, plus `GET /health`.

mod handlers;
pub mod middleware;
mod store;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::AuthConfig;
pub use store::{DuplicateId, ItemStore};

/// Router with no authentication.
pub fn create_router(store: ItemStore) -> Router {
    create_router_with_auth(store, AuthConfig::disabled())
}

/// Router whose `/api` routes require the configured bearer token.
pub fn create_router_with_auth(store: ItemStore, auth: AuthConfig) -> Router {
    let api = Router::new()
        .route(
            "/items",
            get(handlers::list_items).put(handlers::replace_items),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            auth,
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}
