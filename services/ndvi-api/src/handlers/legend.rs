//! Legend handlers.

use axum::{extract::Query, response::Response, Json};
use renderer::{legend_entries, render_legend, LegendEntry};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{png_response, CACHE_PUBLIC};

const MAX_SWATCH: usize = 256;

#[derive(Debug, Deserialize)]
pub struct LegendQuery {
    #[serde(default = "default_swatch_width")]
    pub swatch_width: usize,
    #[serde(default = "default_swatch_height")]
    pub swatch_height: usize,
}

fn default_swatch_width() -> usize {
    24
}

fn default_swatch_height() -> usize {
    16
}

/// GET /api/legend - Category labels, ranges and colors
pub async fn legend_handler() -> Json<Vec<LegendEntry>> {
    Json(legend_entries())
}

/// GET /api/legend.png - Legend swatches, water at the top
pub async fn legend_png_handler(Query(query): Query<LegendQuery>) -> Result<Response, ApiError> {
    let in_range = |v: usize| (1..=MAX_SWATCH).contains(&v);
    if !in_range(query.swatch_width) || !in_range(query.swatch_height) {
        return Err(ApiError::BadRequest(format!(
            "swatch size must be between 1 and {}",
            MAX_SWATCH
        )));
    }

    let png = render_legend(query.swatch_width, query.swatch_height)?;
    Ok(png_response(png, CACHE_PUBLIC))
}
