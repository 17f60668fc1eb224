//! NDVI API Service Library
//!
//! HTTP front end for the raster pipeline: lists available rasters, runs
//! the pipeline on request and serves the classified image, bounds,
//! statistics, legend and mean-NDVI time series.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod sessions;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.raster_dir);
    let static_prefix = state.config.static_prefix.trim_end_matches('/').to_string();

    Router::new()
        // Raster listing
        .route("/api/rasters", get(handlers::rasters::list_rasters_handler))
        // Pipeline results
        .route("/api/ndvi", get(handlers::ndvi::ndvi_handler))
        .route("/api/ndvi/image", get(handlers::ndvi::image_handler))
        // Time series over dated rasters
        .route("/api/trend", get(handlers::trend::trend_handler))
        .route("/api/anomalies", get(handlers::trend::anomalies_handler))
        .route("/api/daily", get(handlers::trend::daily_handler))
        // Legend
        .route("/api/legend", get(handlers::legend::legend_handler))
        .route("/api/legend.png", get(handlers::legend::legend_png_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Raw raster files
        .nest_service(&static_prefix, static_dir)
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
