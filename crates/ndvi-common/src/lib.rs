//! Common types and utilities shared across the NDVI pipeline crates.

pub mod bbox;
pub mod category;
pub mod crs;
pub mod error;
pub mod grid;
pub mod image;

pub use bbox::BoundingBox;
pub use category::{Category, CategoryCounts, PerCategory, Rgb};
pub use crs::{CrsCode, CrsParseError};
pub use error::{ErrorKind, NdviError, NdviResult};
pub use grid::RasterGrid;
pub use image::{ClassifiedImage, Rgba};
