//! Raster extent to geographic bounding corners.

use ndvi_common::{BoundingBox, CrsCode, NdviError, NdviResult};
use projection::{to_geographic, LatLng};
use serde::Serialize;
use tracing::debug;

/// The four geographic corners of a raster extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerSet {
    pub south_west: LatLng,
    pub north_east: LatLng,
    pub south_east: LatLng,
    pub north_west: LatLng,
}

impl CornerSet {
    /// Derive all four corners from the min and max corner points.
    ///
    /// Assumes the extent stays axis-aligned in geographic coordinates.
    pub fn from_min_max(min: LatLng, max: LatLng) -> Self {
        Self {
            south_west: min,
            north_east: max,
            south_east: LatLng::new(min.lat, max.lng),
            north_west: LatLng::new(max.lat, min.lng),
        }
    }
}

/// Check that every extent value is present and non-zero.
///
/// A coordinate of exactly zero is treated as missing.
fn check_extent(extent: &BoundingBox) -> NdviResult<()> {
    for (name, value) in extent.named_values() {
        if !value.is_finite() || value == 0.0 {
            return Err(NdviError::invalid_extent(format!(
                "{} is missing or zero ({})",
                name, value
            )));
        }
    }
    Ok(())
}

/// Bring the raster extent into geographic coordinates.
///
/// Geographic sources are taken as-is. Otherwise only the (xmin, ymin) and
/// (xmax, ymax) corners are transformed and the other two are combined
/// from them, which is exact only for unrotated projections.
pub fn reproject(extent: &BoundingBox, crs: &str) -> NdviResult<CornerSet> {
    check_extent(extent)?;

    let code = CrsCode::parse(crs).map_err(|e| NdviError::reprojection(e.to_string()))?;

    let corners = if code.is_geographic() {
        CornerSet::from_min_max(
            LatLng::new(extent.min_y, extent.min_x),
            LatLng::new(extent.max_y, extent.max_x),
        )
    } else {
        let min = to_geographic(code, extent.min_x, extent.min_y)
            .map_err(|e| NdviError::reprojection(e.to_string()))?;
        let max = to_geographic(code, extent.max_x, extent.max_y)
            .map_err(|e| NdviError::reprojection(e.to_string()))?;
        CornerSet::from_min_max(min, max)
    };

    debug!(
        crs = %code,
        south_west = ?corners.south_west,
        north_east = ?corners.north_east,
        "Extent reprojected"
    );

    Ok(corners)
}
