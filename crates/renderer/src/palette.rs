//! The fixed palette of a classified image.
//!
//! Index 0 is the transparent no-data color; indices 1..=5 follow
//! [`Category::ALL`]. A classified image therefore never needs palette
//! extraction at encode time.

use ndvi_common::{Category, ClassifiedImage, Rgba};
use rayon::prelude::*;

/// Minimum pixels to benefit from parallel index mapping
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Palette shared by every classified image.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    colors: Vec<Rgba>,
}

impl Default for CategoryPalette {
    fn default() -> Self {
        let mut colors = Vec::with_capacity(Category::ALL.len() + 1);
        colors.push(Rgba::TRANSPARENT);
        colors.extend(Category::ALL.iter().map(|c| Rgba::opaque(c.color())));
        Self { colors }
    }
}

impl CategoryPalette {
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Palette index of a category.
    pub fn index_of_category(&self, category: Category) -> u8 {
        // ALL is ordered, slot 0 is reserved for no-data
        Category::ALL
            .iter()
            .position(|c| *c == category)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }

    /// Palette index of an exact color.
    #[inline]
    pub fn index_of(&self, color: Rgba) -> Option<u8> {
        self.colors.iter().position(|c| *c == color).map(|i| i as u8)
    }

    /// Map every pixel of the image to a palette index.
    ///
    /// Returns `None` if any pixel is not a palette color.
    pub fn indices_for(&self, image: &ClassifiedImage) -> Option<Vec<u8>> {
        let pixels = image.as_bytes();
        let num_pixels = pixels.len() / 4;

        let map_pixel = |px: &[u8]| {
            self.index_of(Rgba {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            })
        };

        if num_pixels >= PARALLEL_THRESHOLD {
            pixels.par_chunks_exact(4).map(map_pixel).collect()
        } else {
            pixels.chunks_exact(4).map(map_pixel).collect()
        }
    }
}
