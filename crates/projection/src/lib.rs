//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! Every supported CRS can be brought into geographic (lat/lon) coordinates
//! via [`to_geographic`] and back via [`from_geographic`].

pub mod error;
pub mod geographic;
pub mod mercator;
pub mod transform;
pub mod utm;

pub use error::ProjectionError;
pub use geographic::LatLng;
pub use mercator::WebMercator;
pub use transform::{from_geographic, to_geographic};
pub use utm::TransverseMercator;
