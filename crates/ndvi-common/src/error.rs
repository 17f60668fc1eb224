//! Error types for the NDVI pipeline.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using NdviError.
pub type NdviResult<T> = Result<T, NdviError>;

/// Primary error type for a raster load.
///
/// Every variant is terminal for the load that produced it.
#[derive(Debug, Clone, Error)]
pub enum NdviError {
    /// Malformed or unreadable raster.
    #[error("Failed to decode raster: {0}")]
    Decode(String),

    /// Every sample failed the validity predicate.
    #[error("No valid samples: {0}")]
    NoValidSamples(String),

    /// A raw extent corner is missing or zero-valued.
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    /// Unsupported source CRS or failed transform.
    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    /// Raw bytes are unavailable.
    #[error("Failed to retrieve raster: {0}")]
    Retrieval(String),
}

/// Discriminant of [`NdviError`], carried by failed loads and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    NoValidSamples,
    InvalidExtent,
    Reprojection,
    Retrieval,
}

impl ErrorKind {
    /// Stable identifier used in logs, metrics and HTTP error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::NoValidSamples => "no_valid_samples",
            ErrorKind::InvalidExtent => "invalid_extent",
            ErrorKind::Reprojection => "reprojection",
            ErrorKind::Retrieval => "retrieval",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NdviError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn no_valid_samples(msg: impl Into<String>) -> Self {
        Self::NoValidSamples(msg.into())
    }

    pub fn invalid_extent(msg: impl Into<String>) -> Self {
        Self::InvalidExtent(msg.into())
    }

    pub fn reprojection(msg: impl Into<String>) -> Self {
        Self::Reprojection(msg.into())
    }

    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    /// Get the kind tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NdviError::Decode(_) => ErrorKind::Decode,
            NdviError::NoValidSamples(_) => ErrorKind::NoValidSamples,
            NdviError::InvalidExtent(_) => ErrorKind::InvalidExtent,
            NdviError::Reprojection(_) => ErrorKind::Reprojection,
            NdviError::Retrieval(_) => ErrorKind::Retrieval,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            NdviError::Retrieval(_) => 404,
            NdviError::Decode(_)
            | NdviError::NoValidSamples(_)
            | NdviError::InvalidExtent(_)
            | NdviError::Reprojection(_) => 422,
        }
    }
}

impl From<serde_json::Error> for NdviError {
    fn from(err: serde_json::Error) -> Self {
        NdviError::Decode(format!("JSON error: {}", err))
    }
}
