//! Legend entries and swatch images built from the category table.

use ndvi_common::Category;
use serde::Serialize;

use crate::{png::encode_indexed, CategoryPalette, RenderError};

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub category: Category,
    pub label: &'static str,
    /// Value range in interval notation, e.g. `(0.2, 0.5]`
    pub range: String,
    /// Hex color, e.g. `#a6d96a`
    pub color: String,
}

/// Legend rows in ascending category order.
pub fn legend_entries() -> Vec<LegendEntry> {
    Category::ALL
        .iter()
        .map(|&category| LegendEntry {
            category,
            label: category.label(),
            range: range_text(category),
            color: category.color().to_hex(),
        })
        .collect()
}

fn range_text(category: Category) -> String {
    match (category.lower_bound(), category.upper_bound()) {
        (None, Some(upper)) => format!("≤ {:.1}", upper),
        (Some(lower), None) => format!("> {:.1}", lower),
        (Some(lower), Some(upper)) => format!("({:.1}, {:.1}]", lower, upper),
        (None, None) => "all".to_string(),
    }
}

/// Render a vertical legend as PNG: one solid swatch per category,
/// water at the top.
pub fn render_legend(swatch_width: usize, swatch_height: usize) -> Result<Vec<u8>, RenderError> {
    let palette = CategoryPalette::default();
    let height = swatch_height * Category::ALL.len();

    let mut indices = Vec::with_capacity(swatch_width * height);
    for category in Category::ALL {
        let index = palette.index_of_category(category);
        indices.extend(std::iter::repeat(index).take(swatch_width * swatch_height));
    }

    encode_indexed(swatch_width, height, palette.colors(), &indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_text() {
        assert_eq!(range_text(Category::Water), "≤ -0.2");
        assert_eq!(range_text(Category::Barren), "(-0.2, 0.0]");
        assert_eq!(range_text(Category::Moderate), "(0.2, 0.5]");
        assert_eq!(range_text(Category::Dense), "> 0.5");
    }

    #[test]
    fn test_entries_follow_table() {
        let entries = legend_entries();
        assert_eq!(entries.len(), 5);
        for (entry, category) in entries.iter().zip(Category::ALL) {
            assert_eq!(entry.category, category);
            assert_eq!(entry.color, category.color().to_hex());
        }

        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["category"], "water");
        assert_eq!(json["range"], "≤ -0.2");
    }
}
