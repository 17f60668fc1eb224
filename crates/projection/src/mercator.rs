//! Spherical Web Mercator (EPSG:3857).

use std::f64::consts::PI;

/// Web Mercator projection on the WGS84 semi-major axis sphere.
#[derive(Debug, Clone, Copy)]
pub struct WebMercator {
    /// Sphere radius (meters)
    pub radius: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self { radius: 6378137.0 }
    }
}

impl WebMercator {
    /// Latitude limit (degrees) at which the projection is square.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    /// Half the width of the projected world (meters).
    pub fn max_extent(&self) -> f64 {
        PI * self.radius
    }

    /// Convert lat/lon (degrees) to projected x/y (meters).
    pub fn forward(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE).to_radians();
        let x = self.radius * lon_deg.to_radians();
        let y = self.radius * (PI / 4.0 + lat / 2.0).tan().ln();
        (x, y)
    }

    /// Convert projected x/y (meters) to lat/lon (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - PI / 2.0).to_degrees();
        (lat, lon)
    }

    /// Check that a projected point lies within the world square.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        // Allow a small tolerance for extents snapped slightly past the edge
        let limit = self.max_extent() * (1.0 + 1e-9);
        x.abs() <= limit && y.abs() <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let merc = WebMercator::default();
        let (x, y) = merc.forward(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
        let (lat, lon) = merc.inverse(0.0, 0.0);
        assert!(lat.abs() < 1e-9);
        assert!(lon.abs() < 1e-9);
    }

    #[test]
    fn test_world_corner() {
        let merc = WebMercator::default();
        let extent = merc.max_extent();
        assert!((extent - 20037508.342789244).abs() < 1e-6);

        let (lat, lon) = merc.inverse(extent, extent);
        assert!((lon - 180.0).abs() < 1e-9);
        assert!((lat - WebMercator::MAX_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        let merc = WebMercator::default();
        for &(lat, lon) in &[(34.05, -118.25), (-33.87, 151.21), (64.15, -21.94)] {
            let (x, y) = merc.forward(lat, lon);
            let (lat2, lon2) = merc.inverse(x, y);
            assert!((lat - lat2).abs() < 1e-9, "lat {} vs {}", lat, lat2);
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
        }
    }

    #[test]
    fn test_contains() {
        let merc = WebMercator::default();
        assert!(merc.contains(0.0, 0.0));
        assert!(merc.contains(20037508.342789244, -20037508.342789244));
        assert!(!merc.contains(2.1e7, 0.0));
    }
}
