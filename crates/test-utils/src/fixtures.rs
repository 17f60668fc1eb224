//! Common test fixtures for NDVI rasters.

use std::path::{Path, PathBuf};

use ndvi_common::{BoundingBox, RasterGrid};

/// Extents used across the test suite, as (xmin, ymin, xmax, ymax).
pub mod extent {
    /// Small geographic box over southern California
    pub const SOCAL: (f64, f64, f64, f64) = (-118.5, 34.5, -118.0, 35.0);

    /// Sentinel-2 tile T11SLT in UTM zone 11N metres
    pub const UTM_T11SLT: (f64, f64, f64, f64) = (300000.0, 3790200.0, 409800.0, 3900000.0);

    /// Tile T21HUB near Buenos Aires in UTM zone 21S metres
    pub const UTM_T21HUB: (f64, f64, f64, f64) = (300000.0, 6090220.0, 409800.0, 6200020.0);

    /// Web Mercator box around Madrid
    pub const MERCATOR_MADRID: (f64, f64, f64, f64) = (-420000.0, 4920000.0, -400000.0, 4940000.0);

    /// One corner on the equator, rejected as missing
    pub const ZERO_CORNER: (f64, f64, f64, f64) = (10.0, 0.0, 11.0, 1.0);
}

/// CRS identifiers as they appear in raster headers.
pub mod crs {
    pub const EPSG_4326: &str = "EPSG:4326";
    pub const EPSG_3857: &str = "EPSG:3857";
    pub const CRS_84: &str = "CRS:84";
    pub const UTM_11N: &str = "EPSG:32611";
    pub const UTM_21S: &str = "EPSG:32721";
}

/// Build a bounding box from an extent tuple.
pub fn bbox(extent: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(extent.0, extent.1, extent.2, extent.3)
}

/// Build a grid, panicking if the sample count does not fit.
pub fn grid(
    width: usize,
    height: usize,
    samples: Vec<f64>,
    crs: &str,
    extent: (f64, f64, f64, f64),
) -> RasterGrid {
    RasterGrid::new(width, height, samples, crs, bbox(extent))
        .unwrap_or_else(|e| panic!("invalid test grid: {}", e))
}

/// Grid in geographic coordinates over [`extent::SOCAL`].
pub fn geographic_grid(width: usize, height: usize, samples: Vec<f64>) -> RasterGrid {
    grid(width, height, samples, crs::EPSG_4326, extent::SOCAL)
}

/// 2×2 scaled-integer grid with one no-data sample.
pub fn scaled_grid_with_nodata() -> RasterGrid {
    geographic_grid(2, 2, vec![-9999.0, 3000.0, 6000.0, -1000.0])
}

/// A temporary directory holding raster files.
pub struct RasterDir {
    dir: tempfile::TempDir,
}

impl RasterDir {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("ndvi-rasters-")
            .tempdir()
            .unwrap_or_else(|e| panic!("failed to create temp dir: {}", e));
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to `name` inside the directory and return the full path.
    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {}: {}", parent.display(), e));
        }
        std::fs::write(&path, bytes)
            .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
        path
    }
}

impl Default for RasterDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_grid_shape() {
        let g = scaled_grid_with_nodata();
        assert_eq!(g.width(), 2);
        assert_eq!(g.height(), 2);
        assert_eq!(g.crs(), "EPSG:4326");
    }

    #[test]
    fn test_raster_dir_write() {
        let dir = RasterDir::new();
        let path = dir.write("nested/NDVI_a.json", b"{}");
        assert_eq!(std::fs::read(path).unwrap(), b"{}");
    }

    #[test]
    #[should_panic(expected = "invalid test grid")]
    fn test_grid_rejects_mismatch() {
        geographic_grid(2, 2, vec![0.1]);
    }
}
