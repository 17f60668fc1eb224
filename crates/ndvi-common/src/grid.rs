//! Decoded raster grids.

use crate::{BoundingBox, NdviError, NdviResult};
use std::slice::ChunksExact;

/// A decoded, georeferenced grid of numeric samples.
///
/// Samples are stored as one flat row-major buffer (`row * width + col`)
/// from the decode boundary onward. No-data is carried as NaN or as
/// whatever sentinel the source used; the validity predicate decides.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    samples: Vec<f64>,
    crs: String,
    extent: BoundingBox,
}

impl RasterGrid {
    /// Create a grid, checking that `samples.len() == width * height`.
    pub fn new(
        width: usize,
        height: usize,
        samples: Vec<f64>,
        crs: impl Into<String>,
        extent: BoundingBox,
    ) -> NdviResult<Self> {
        if width == 0 || height == 0 {
            return Err(NdviError::decode(format!(
                "grid dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let expected = width.checked_mul(height).ok_or_else(|| {
            NdviError::decode(format!("grid dimensions {}x{} overflow", width, height))
        })?;

        if samples.len() != expected {
            return Err(NdviError::decode(format!(
                "expected {} samples for {}x{} grid, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
            crs: crs.into(),
            extent,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of samples (`width * height`).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The flat row-major sample buffer.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Source CRS identifier, as carried in the raster metadata.
    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Raw extent in the source CRS.
    pub fn extent(&self) -> &BoundingBox {
        &self.extent
    }

    /// Sample at column `i`, row `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.width || j >= self.height {
            return None;
        }
        Some(self.samples[j * self.width + i])
    }

    /// One row of samples, borrowed from the flat buffer.
    pub fn row(&self, j: usize) -> Option<&[f64]> {
        if j >= self.height {
            return None;
        }
        let start = j * self.width;
        Some(&self.samples[start..start + self.width])
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> ChunksExact<'_, f64> {
        self.samples.chunks_exact(self.width)
    }
}
