//! Flat-Earth area approximation over a geographic bounding box.

use crate::reproject::CornerSet;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate the surface area covered by the corners, in km².
///
/// Treats the box as a flat rectangle: the east-west side is scaled by
/// the cosine of the mean latitude. Adequate for tile-sized extents only.
pub fn estimate_area_km2(corners: &CornerSet) -> f64 {
    let sw = corners.south_west;
    let ne = corners.north_east;

    let lat_span = (ne.lat - sw.lat).to_radians();
    let lng_span = (ne.lng - sw.lng).to_radians();
    let mean_lat = ((ne.lat + sw.lat) / 2.0).to_radians();

    let width_km = EARTH_RADIUS_KM * lng_span * mean_lat.cos();
    let height_km = EARTH_RADIUS_KM * lat_span;

    (width_km * height_km).abs()
}
