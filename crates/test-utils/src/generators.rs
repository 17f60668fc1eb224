//! Test data generators for synthetic NDVI rasters.
//!
//! Values follow simple, predictable patterns so tests can compute the
//! expected categories and statistics by hand.

/// Creates a row-major gradient from -1.0 (first sample) to 1.0 (last).
///
/// # Example
///
/// ```
/// use test_utils::create_ndvi_gradient;
///
/// let grid = create_ndvi_gradient(3, 1);
/// assert_eq!(grid, vec![-1.0, 0.0, 1.0]);
/// ```
pub fn create_ndvi_gradient(width: usize, height: usize) -> Vec<f64> {
    let count = width * height;
    if count <= 1 {
        return vec![0.0; count];
    }
    let step = 2.0 / (count - 1) as f64;
    (0..count).map(|i| -1.0 + i as f64 * step).collect()
}

/// Same gradient as [`create_ndvi_gradient`] stored as index × 10000,
/// rounded to whole numbers the way integer products are.
pub fn create_scaled_ndvi_gradient(width: usize, height: usize) -> Vec<f64> {
    create_ndvi_gradient(width, height)
        .into_iter()
        .map(|v| (v * 10000.0).round())
        .collect()
}

/// Creates a grid where every sample has the same value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Replaces every `interval`-th sample (starting at 0) with `nodata`.
pub fn with_nodata(mut samples: Vec<f64>, interval: usize, nodata: f64) -> Vec<f64> {
    if interval == 0 {
        return samples;
    }
    for value in samples.iter_mut().step_by(interval) {
        *value = nodata;
    }
    samples
}

/// Samples that hit every category exactly once, in unit scale.
///
/// Order: water, barren, sparse, moderate, dense.
pub fn one_per_category() -> Vec<f64> {
    vec![-0.5, -0.1, 0.1, 0.35, 0.8]
}
