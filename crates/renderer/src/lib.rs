//! Image rendering for classified vegetation-index rasters.
//!
//! - Indexed PNG encoding against the fixed category palette
//! - RGBA PNG fallback for arbitrary pixel data
//! - Legend entries and legend swatch images from the shared category table

pub mod error;
pub mod legend;
pub mod palette;
pub mod png;

pub use error::RenderError;
pub use legend::{legend_entries, render_legend, LegendEntry};
pub use palette::CategoryPalette;
pub use png::{encode_classified, encode_indexed, encode_rgba};
