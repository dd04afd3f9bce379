//! Route definitions for the field monitoring API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/ndvi", ndvi_routes())
}

/// NDVI analysis, imagery and trend routes
fn ndvi_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(handlers::analyze_ndvi))
        .route("/image", post(handlers::true_color_image))
        .route("/heatmap", post(handlers::ndvi_heatmap))
        .route("/history", get(handlers::ndvi_history))
        .route("/trend", post(handlers::ndvi_trend))
        .route("/health-status", get(handlers::health_status))
}
