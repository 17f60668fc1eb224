//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A raster extent in its source coordinate system.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, UTM), coordinates are in meters.
/// A missing coordinate is carried as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// The (x, y) of the minimum corner.
    pub fn min_corner(&self) -> (f64, f64) {
        (self.min_x, self.min_y)
    }

    /// The (x, y) of the maximum corner.
    pub fn max_corner(&self) -> (f64, f64) {
        (self.max_x, self.max_y)
    }

    /// Named coordinate values in `xmin, ymin, xmax, ymax` order.
    pub fn named_values(&self) -> [(&'static str, f64); 4] {
        [
            ("xmin", self.min_x),
            ("ymin", self.min_y),
            ("xmax", self.max_x),
            ("ymax", self.max_y),
        ]
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
