//! Vegetation categories, their thresholds and display colors.
//!
//! This table is the single source of truth for both classification and
//! legend rendering.

use serde::Serialize;
use std::fmt;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Ordered vegetation categories over normalized index values.
///
/// Buckets are closed on their upper bound:
/// water ≤ -0.2 < barren ≤ 0.0 < sparse ≤ 0.2 < moderate ≤ 0.5 < dense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Water,
    Barren,
    Sparse,
    Moderate,
    Dense,
}

impl Category {
    /// All categories in ascending value order.
    pub const ALL: [Category; 5] = [
        Category::Water,
        Category::Barren,
        Category::Sparse,
        Category::Moderate,
        Category::Dense,
    ];

    /// Inclusive upper bound of this bucket, `None` for the open top bucket.
    pub const fn upper_bound(&self) -> Option<f64> {
        match self {
            Category::Water => Some(-0.2),
            Category::Barren => Some(0.0),
            Category::Sparse => Some(0.2),
            Category::Moderate => Some(0.5),
            Category::Dense => None,
        }
    }

    /// Exclusive lower bound of this bucket, `None` for the open bottom bucket.
    pub const fn lower_bound(&self) -> Option<f64> {
        match self {
            Category::Water => None,
            Category::Barren => Category::Water.upper_bound(),
            Category::Sparse => Category::Barren.upper_bound(),
            Category::Moderate => Category::Sparse.upper_bound(),
            Category::Dense => Category::Moderate.upper_bound(),
        }
    }

    pub const fn color(&self) -> Rgb {
        match self {
            Category::Water => Rgb::new(69, 117, 180),
            Category::Barren => Rgb::new(166, 97, 26),
            Category::Sparse => Rgb::new(223, 194, 125),
            Category::Moderate => Rgb::new(166, 217, 106),
            Category::Dense => Rgb::new(26, 150, 65),
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Category::Water => "Water",
            Category::Barren => "Barren",
            Category::Sparse => "Sparse vegetation",
            Category::Moderate => "Moderate vegetation",
            Category::Dense => "Dense vegetation",
        }
    }

    /// Map a normalized value to exactly one category.
    ///
    /// Callers must only pass values that passed the validity predicate.
    pub fn classify(value: f64) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.upper_bound().map_or(true, |upper| value <= upper))
            .unwrap_or(Category::Dense)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per category, serialized with the category names as keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerCategory<T> {
    pub water: T,
    pub barren: T,
    pub sparse: T,
    pub moderate: T,
    pub dense: T,
}

impl<T: Copy> PerCategory<T> {
    pub fn get(&self, category: Category) -> T {
        match category {
            Category::Water => self.water,
            Category::Barren => self.barren,
            Category::Sparse => self.sparse,
            Category::Moderate => self.moderate,
            Category::Dense => self.dense,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Water => &mut self.water,
            Category::Barren => &mut self.barren,
            Category::Sparse => &mut self.sparse,
            Category::Moderate => &mut self.moderate,
            Category::Dense => &mut self.dense,
        }
    }

    /// Build from a function of the category.
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            water: f(Category::Water),
            barren: f(Category::Barren),
            sparse: f(Category::Sparse),
            moderate: f(Category::Moderate),
            dense: f(Category::Dense),
        }
    }

    /// Iterate `(category, value)` in ascending category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Per-category pixel counts.
pub type CategoryCounts = PerCategory<u64>;

impl CategoryCounts {
    pub fn increment(&mut self, category: Category) {
        *self.get_mut(category) += 1;
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, n)| n).sum()
    }
}
