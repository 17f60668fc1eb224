//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known CRS codes the pipeline can bring into geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
    /// WGS84 / UTM zone (EPSG:326xx north, EPSG:327xx south)
    Utm { zone: u8, north: bool },
}

impl CrsCode {
    /// Parse a CRS identifier as carried in raster metadata.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:32610"
    /// - "CRS:84" / "OGC:CRS84" (equivalent to EPSG:4326 with lon/lat axis order)
    /// - "urn:ogc:def:crs:EPSG::3857"
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "CRS:84" | "OGC:CRS84" | "WGS84" => return Ok(CrsCode::Epsg4326),
            _ => {}
        }

        let code = normalized
            .strip_prefix("EPSG:")
            .or_else(|| normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG::"))
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;

        let code: u32 = code
            .parse()
            .map_err(|_| CrsParseError::InvalidCode(s.to_string()))?;

        Self::from_epsg(code).ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))
    }

    /// Map a numeric EPSG code to a supported CRS.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(CrsCode::Epsg4326),
            4269 => Some(CrsCode::Epsg4269),
            3857 | 900913 => Some(CrsCode::Epsg3857),
            32601..=32660 => Some(CrsCode::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Some(CrsCode::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => None,
        }
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Utm { zone, north: true } => 32600 + *zone as u32,
            CrsCode::Utm { zone, north: false } => 32700 + *zone as u32,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid EPSG code in CRS: {0}")]
    InvalidCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::parse("epsg:3857").unwrap(), CrsCode::Epsg3857);
        assert_eq!(CrsCode::parse("CRS:84").unwrap(), CrsCode::Epsg4326);
        assert_eq!(
            CrsCode::parse("urn:ogc:def:crs:EPSG::4269").unwrap(),
            CrsCode::Epsg4269
        );
        assert!(CrsCode::parse("EPSG:99999").is_err());
        assert!(CrsCode::parse("EPSG:abc").is_err());
        assert!(CrsCode::parse("").is_err());
    }

    #[test]
    fn test_parse_utm() {
        assert_eq!(
            CrsCode::parse("EPSG:32610").unwrap(),
            CrsCode::Utm { zone: 10, north: true }
        );
        assert_eq!(
            CrsCode::parse("EPSG:32733").unwrap(),
            CrsCode::Utm { zone: 33, north: false }
        );
        assert!(CrsCode::parse("EPSG:32600").is_err());
        assert!(CrsCode::parse("EPSG:32661").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for code in [4326, 4269, 3857, 32611, 32756] {
            let crs = CrsCode::from_epsg(code).unwrap();
            assert_eq!(crs.epsg(), code);
            assert_eq!(CrsCode::parse(&crs.to_string()).unwrap(), crs);
        }
    }

    #[test]
    fn test_is_geographic() {
        assert!(CrsCode::Epsg4326.is_geographic());
        assert!(CrsCode::Epsg4269.is_geographic());
        assert!(!CrsCode::Epsg3857.is_geographic());
        assert!(!CrsCode::Utm { zone: 11, north: true }.is_geographic());
    }
}
