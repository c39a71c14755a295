//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Prayer schedules
        .route(
            "/api/v1/shalat-schedule/by-coordinate",
            get(handlers::schedule_by_coordinate),
        )
        .route(
            "/api/v1/shalat-schedule/by-location",
            get(handlers::schedule_by_location),
        )

        // Image proxy
        .route("/api/v1/image", get(handlers::proxy_image))

        .with_state(state)
}
