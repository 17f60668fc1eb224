//! Dispatch between supported CRSs and geographic coordinates.

use ndvi_common::CrsCode;

use crate::geographic::normalize_lng;
use crate::{LatLng, ProjectionError, TransverseMercator, WebMercator};

/// Transform a point in `crs` coordinates into geographic coordinates.
///
/// Geographic CRSs pass through unchanged (x = longitude, y = latitude).
pub fn to_geographic(crs: CrsCode, x: f64, y: f64) -> Result<LatLng, ProjectionError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ProjectionError::NonFinite {
            x,
            y,
            crs: crs.to_string(),
        });
    }

    let point = match crs {
        CrsCode::Epsg4326 | CrsCode::Epsg4269 => LatLng::new(y, x),
        CrsCode::Epsg3857 => {
            let merc = WebMercator::default();
            if !merc.contains(x, y) {
                return Err(ProjectionError::OutOfDomain {
                    x,
                    y,
                    crs: crs.to_string(),
                });
            }
            let (lat, lon) = merc.inverse(x, y);
            wrapped(crs, x, y, lat, lon)?
        }
        CrsCode::Utm { zone, north } => {
            let tm = TransverseMercator::utm(zone, north);
            if !tm.contains(x, y) {
                return Err(ProjectionError::OutOfDomain {
                    x,
                    y,
                    crs: crs.to_string(),
                });
            }
            let (lat, lon) = tm.inverse(x, y);
            wrapped(crs, x, y, lat, lon)?
        }
    };

    if !point.is_valid() {
        return Err(ProjectionError::OutOfDomain {
            x,
            y,
            crs: crs.to_string(),
        });
    }

    Ok(point)
}

/// Reject non-finite inverse results, then wrap the longitude.
fn wrapped(crs: CrsCode, x: f64, y: f64, lat: f64, lon: f64) -> Result<LatLng, ProjectionError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(ProjectionError::NonFinite {
            x,
            y,
            crs: crs.to_string(),
        });
    }
    Ok(LatLng::new(lat, normalize_lng(lon)))
}

/// Transform a geographic point into `crs` coordinates, returning (x, y).
pub fn from_geographic(crs: CrsCode, point: LatLng) -> Result<(f64, f64), ProjectionError> {
    if !point.is_valid() {
        return Err(ProjectionError::OutOfDomain {
            x: point.lng,
            y: point.lat,
            crs: "EPSG:4326".to_string(),
        });
    }

    let (x, y) = match crs {
        CrsCode::Epsg4326 | CrsCode::Epsg4269 => (point.lng, point.lat),
        CrsCode::Epsg3857 => WebMercator::default().forward(point.lat, point.lng),
        CrsCode::Utm { zone, north } => {
            TransverseMercator::utm(zone, north).forward(point.lat, point.lng)
        }
    };

    Ok((x, y))
}
