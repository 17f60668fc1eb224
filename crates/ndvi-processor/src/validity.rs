//! The sample validity predicate.
//!
//! Every pass over a grid must use this one function so that the scanner
//! and the classifier agree on which samples count.

/// Samples at or below this value are no-data.
pub const NODATA_FLOOR: f64 = -9999.0;

/// Samples at or above this value are no-data.
pub const NODATA_CEILING: f64 = 10000.0;

/// A sample is valid when it is finite, not exactly zero and strictly
/// inside (-9999, 10000).
///
/// Zero is treated as no-data, so a legitimate zero measurement is dropped.
#[inline]
pub fn is_valid_sample(value: f64) -> bool {
    value.is_finite() && value != 0.0 && value > NODATA_FLOOR && value < NODATA_CEILING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_rejected() {
        assert!(!is_valid_sample(f64::NAN));
        assert!(!is_valid_sample(f64::INFINITY));
        assert!(!is_valid_sample(f64::NEG_INFINITY));
        assert!(!is_valid_sample(0.0));
        assert!(!is_valid_sample(-0.0));
        assert!(!is_valid_sample(-9999.0));
        assert!(!is_valid_sample(10000.0));
        assert!(!is_valid_sample(-32768.0));
    }

    #[test]
    fn test_bounds_are_exclusive() {
        assert!(is_valid_sample(-9998.9));
        assert!(is_valid_sample(9999.9));
        assert!(is_valid_sample(0.0001));
        assert!(is_valid_sample(-1.0));
    }
}
