//! Raster listing handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use metrics::counter;

use crate::catalog::{list_rasters, RasterEntry};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/rasters - Rasters available for display, sorted by name
pub async fn list_rasters_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<RasterEntry>>, ApiError> {
    counter!("ndvi_http_requests_total", "endpoint" => "rasters").increment(1);

    let listing = tokio::task::spawn_blocking(move || list_rasters(&state.config))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    Ok(Json(listing))
}
