//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{import_channels, list_subscriptions, list_videos, sync_subscriptions, AppState};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the API router.
///
/// Every `/api` route requires a bearer token.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let api_routes = Router::new()
        .route("/sync", post(sync_subscriptions))
        .route("/import", post(import_channels))
        .route("/subscriptions", get(list_subscriptions))
        .route("/videos", get(list_videos));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create the unauthenticated health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
