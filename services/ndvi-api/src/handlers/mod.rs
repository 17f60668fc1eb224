//! HTTP request handlers for the NDVI API.

pub mod health;
pub mod legend;
pub mod ndvi;
pub mod rasters;
pub mod trend;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Cache policy for images that never change.
pub(crate) const CACHE_PUBLIC: &str = "public, max-age=300";
/// Cache policy for per-session images.
pub(crate) const CACHE_PRIVATE: &str = "private, no-store";

/// Wrap encoded PNG bytes in a response.
pub(crate) fn png_response(png: Vec<u8>, cache_control: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, cache_control),
        ],
        png,
    )
        .into_response()
}
