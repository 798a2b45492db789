//! Route definitions for the Krishi Mitra service

use axum::{routing::post, Router};

use crate::{handlers, AppState};

/// Create recommendation routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recommendations/location",
            post(handlers::recommend_by_location),
        )
        // Versioned path
        .route(
            "/v1/recommendations/location",
            post(handlers::recommend_by_location),
        )
        // Path used by existing clients
        .route("/recommend-by-location", post(handlers::recommend_by_location))
}
