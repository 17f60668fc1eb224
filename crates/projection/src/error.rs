//! Projection error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("point ({x}, {y}) is outside the domain of {crs}")]
    OutOfDomain { x: f64, y: f64, crs: String },

    #[error("transform of ({x}, {y}) in {crs} produced a non-finite result")]
    NonFinite { x: f64, y: f64, crs: String },
}
