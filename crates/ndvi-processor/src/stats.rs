//! Summary statistics for a processed raster.

use ndvi_common::{CategoryCounts, PerCategory, RasterGrid};
use serde::Serialize;

use crate::classify::Classification;
use crate::reproject::CornerSet;
use crate::scan::{ScaleFactor, ScanResult};

/// Everything the presentation layer shows about one raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Normalized minimum over valid samples
    pub min: f64,
    /// Normalized maximum over valid samples
    pub max: f64,
    pub mean: f64,
    pub valid_count: u64,
    pub total_count: u64,
    pub area_km2: f64,
    pub counts: CategoryCounts,
    /// Share of valid samples per category, one decimal place
    pub percentages: PerCategory<f64>,
    pub crs: String,
    pub width: usize,
    pub height: usize,
    pub corners: CornerSet,
    pub scale_factor: ScaleFactor,
}

/// Percentage of `count` in `total`, rounded to one decimal.
fn percentage(count: u64, total: u64) -> f64 {
    let raw = 100.0 * count as f64 / total as f64;
    (raw * 10.0).round() / 10.0
}

/// Assemble the report from the outputs of the earlier stages.
///
/// Must only be called after a successful scan, so `valid_count` is never zero.
pub fn aggregate(
    scan: &ScanResult,
    classification: &Classification,
    corners: CornerSet,
    area_km2: f64,
    grid: &RasterGrid,
) -> Report {
    debug_assert_eq!(
        scan.valid_count, classification.valid_count,
        "scan and classification disagree on valid samples"
    );

    let valid_count = classification.valid_count;
    let counts = classification.counts;
    let percentages = PerCategory::from_fn(|category| percentage(counts.get(category), valid_count));

    Report {
        min: classification.min,
        max: classification.max,
        mean: classification.mean().unwrap_or(f64::NAN),
        valid_count,
        total_count: scan.total_count,
        area_km2,
        counts,
        percentages,
        crs: grid.crs().to_string(),
        width: grid.width(),
        height: grid.height(),
        corners,
        scale_factor: scan.scale_factor,
    }
}
