//! Category classification and image coloring.

use ndvi_common::{Category, CategoryCounts, ClassifiedImage, RasterGrid, Rgba};

use crate::scan::ScaleFactor;
use crate::validity::is_valid_sample;

/// Output of the classification pass.
#[derive(Debug, Clone)]
pub struct Classification {
    pub image: ClassifiedImage,
    pub counts: CategoryCounts,
    /// Normalized minimum over valid samples
    pub min: f64,
    /// Normalized maximum over valid samples
    pub max: f64,
    /// Normalized sum over valid samples
    pub sum: f64,
    pub valid_count: u64,
}

impl Classification {
    /// Mean of normalized valid samples, `None` if there were none.
    pub fn mean(&self) -> Option<f64> {
        if self.valid_count == 0 {
            None
        } else {
            Some(self.sum / self.valid_count as f64)
        }
    }
}

/// Color every sample and count categories in one pass.
///
/// Invalid samples become transparent; valid samples are normalized with
/// `scale` and painted with their category's color at full opacity.
pub fn classify(grid: &RasterGrid, scale: ScaleFactor) -> Classification {
    let mut image = ClassifiedImage::new(grid.width(), grid.height());
    let mut counts = CategoryCounts::default();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut valid_count: u64 = 0;

    for (idx, &raw) in grid.samples().iter().enumerate() {
        if !is_valid_sample(raw) {
            image.set(idx, Rgba::TRANSPARENT);
            continue;
        }

        let value = scale.normalize(raw);
        valid_count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);

        let category = Category::classify(value);
        counts.increment(category);
        image.set(idx, Rgba::opaque(category.color()));
    }

    Classification {
        image,
        counts,
        min,
        max,
        sum,
        valid_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_common::BoundingBox;

    fn grid(width: usize, height: usize, samples: Vec<f64>) -> RasterGrid {
        RasterGrid::new(
            width,
            height,
            samples,
            "EPSG:4326",
            BoundingBox::new(-1.0, -1.0, 1.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_classify_scaled() {
        let g = grid(2, 2, vec![-9999.0, 3000.0, 6000.0, -1000.0]);
        let result = classify(&g, ScaleFactor::SCALED);

        assert_eq!(result.valid_count, 3);
        assert_eq!(result.counts.barren, 1);
        assert_eq!(result.counts.moderate, 1);
        assert_eq!(result.counts.dense, 1);
        assert!((result.min - -0.1).abs() < 1e-12);
        assert!((result.max - 0.6).abs() < 1e-12);
        assert!((result.mean().unwrap() - 0.26666).abs() < 1e-4);

        assert_eq!(result.image.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(
            result.image.pixel(1, 0),
            Some(Rgba::opaque(Category::Moderate.color()))
        );
        assert_eq!(
            result.image.pixel(0, 1),
            Some(Rgba::opaque(Category::Dense.color()))
        );
        assert_eq!(
            result.image.pixel(1, 1),
            Some(Rgba::opaque(Category::Barren.color()))
        );
    }

    #[test]
    fn test_every_valid_sample_counted_once() {
        let samples: Vec<f64> = (-10..=10).map(|i| i as f64 / 10.0).collect();
        let g = grid(samples.len(), 1, samples);
        let result = classify(&g, ScaleFactor::UNIT);

        // 0.0 is no-data; the other 20 samples land in exactly one bucket
        assert_eq!(result.valid_count, 20);
        assert_eq!(result.counts.total(), 20);
        assert_eq!(result.counts.water, 9); // -1.0 ..= -0.2
        assert_eq!(result.counts.barren, 1); // -0.1
        assert_eq!(result.counts.sparse, 2); // 0.1, 0.2
        assert_eq!(result.counts.moderate, 3); // 0.3 ..= 0.5
        assert_eq!(result.counts.dense, 5); // 0.6 ..= 1.0
    }

    #[test]
    fn test_no_valid_samples_has_no_mean() {
        let g = grid(2, 1, vec![0.0, f64::NAN]);
        let result = classify(&g, ScaleFactor::UNIT);
        assert_eq!(result.valid_count, 0);
        assert!(result.mean().is_none());
    }
}
