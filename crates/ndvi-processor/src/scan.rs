//! Validity scan and implicit scale detection.

use ndvi_common::{NdviError, NdviResult, RasterGrid};
use serde::Serialize;
use tracing::debug;

use crate::validity::is_valid_sample;

/// Raw values outside ±this envelope are taken to be scaled integers.
const UNIT_ENVELOPE: f64 = 1.5;

/// Divisor that brings raw samples into index units.
///
/// Fixed once per grid; every later normalization uses the same value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Values already in index units.
    pub const UNIT: ScaleFactor = ScaleFactor(1.0);
    /// Values stored as index × 10000.
    pub const SCALED: ScaleFactor = ScaleFactor(10000.0);

    /// Pick the scale from raw extrema of the valid samples.
    pub fn detect(raw_min: f64, raw_max: f64) -> Self {
        if raw_max > UNIT_ENVELOPE || raw_min < -UNIT_ENVELOPE {
            Self::SCALED
        } else {
            Self::UNIT
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Bring a raw sample into index units.
    #[inline]
    pub fn normalize(&self, raw: f64) -> f64 {
        raw / self.0
    }
}

/// Output of the validity scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanResult {
    pub scale_factor: ScaleFactor,
    pub raw_min: f64,
    pub raw_max: f64,
    pub valid_count: u64,
    pub total_count: u64,
}

/// Single pass over the grid computing valid-sample extrema and count.
///
/// Fails with `NoValidSamples` when no sample passes the validity predicate.
pub fn scan(grid: &RasterGrid) -> NdviResult<ScanResult> {
    let mut raw_min = f64::INFINITY;
    let mut raw_max = f64::NEG_INFINITY;
    let mut valid_count: u64 = 0;

    for &value in grid.samples() {
        if !is_valid_sample(value) {
            continue;
        }
        valid_count += 1;
        if value < raw_min {
            raw_min = value;
        }
        if value > raw_max {
            raw_max = value;
        }
    }

    let total_count = grid.len() as u64;

    if valid_count == 0 {
        return Err(NdviError::no_valid_samples(format!(
            "all {} samples are no-data",
            total_count
        )));
    }

    if !raw_min.is_finite() || !raw_max.is_finite() {
        return Err(NdviError::no_valid_samples(format!(
            "non-finite extrema min={} max={}",
            raw_min, raw_max
        )));
    }

    let scale_factor = ScaleFactor::detect(raw_min, raw_max);

    debug!(
        raw_min,
        raw_max,
        valid_count,
        total_count,
        scale_factor = scale_factor.value(),
        "Validity scan complete"
    );

    Ok(ScanResult {
        scale_factor,
        raw_min,
        raw_max,
        valid_count,
        total_count,
    })
}
