//! Mean-NDVI time series over dated rasters.
//!
//! Several rasters acquired on the same day (different tiles) form one
//! daily mosaic. Its mean is weighted by each raster's valid-sample count,
//! so a mostly-empty tile does not pull the day's value around.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::stats::Report;

/// Day-over-day change above which a day is flagged.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.1;

/// Mean NDVI of every raster acquired on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMean {
    pub date: NaiveDate,
    pub mean_ndvi: f64,
    pub valid_count: u64,
    /// Number of rasters combined into this day
    pub rasters: usize,
}

/// A day whose mean moved more than the threshold since the previous day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub date: NaiveDate,
    pub mean_ndvi: f64,
    /// Change from the previous listed day
    pub change: f64,
}

/// Combine per-raster reports into one mean per day, oldest first.
pub fn daily_means<'a>(
    reports: impl IntoIterator<Item = (NaiveDate, &'a Report)>,
) -> Vec<DailyMean> {
    // date -> (weighted sum, valid count, rasters)
    let mut days: BTreeMap<NaiveDate, (f64, u64, usize)> = BTreeMap::new();

    for (date, report) in reports {
        if report.valid_count == 0 {
            continue;
        }
        let day = days.entry(date).or_insert((0.0, 0, 0));
        day.0 += report.mean * report.valid_count as f64;
        day.1 += report.valid_count;
        day.2 += 1;
    }

    days.into_iter()
        .map(|(date, (sum, valid_count, rasters))| DailyMean {
            date,
            mean_ndvi: sum / valid_count as f64,
            valid_count,
            rasters,
        })
        .collect()
}

/// Flag days whose mean changed by more than `threshold` since the day before.
///
/// The first day has no predecessor and is never flagged.
pub fn detect_anomalies(series: &[DailyMean], threshold: f64) -> Vec<Anomaly> {
    series
        .windows(2)
        .filter_map(|pair| {
            let change = pair[1].mean_ndvi - pair[0].mean_ndvi;
            (change.abs() > threshold).then(|| Anomaly {
                date: pair[1].date,
                mean_ndvi: pair[1].mean_ndvi,
                change,
            })
        })
        .collect()
}

/// Round to four decimals for display.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::CornerSet;
    use crate::scan::ScaleFactor;
    use ndvi_common::PerCategory;
    use projection::LatLng;

    fn report(mean: f64, valid_count: u64) -> Report {
        let corner = LatLng::new(34.5, -118.5);
        Report {
            min: mean,
            max: mean,
            mean,
            valid_count,
            total_count: valid_count,
            area_km2: 1.0,
            counts: PerCategory::default(),
            percentages: PerCategory::default(),
            crs: "EPSG:4326".to_string(),
            width: 1,
            height: 1,
            corners: CornerSet::from_min_max(corner, corner),
            scale_factor: ScaleFactor::UNIT,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[test]
    fn test_same_day_weighted_by_valid_count() {
        let a = report(0.2, 1);
        let b = report(0.6, 3);
        let c = report(0.4, 2);
        let series = daily_means([(day(2), &a), (day(1), &c), (day(2), &b)]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, day(1));
        assert_eq!(series[0].mean_ndvi, 0.4);
        assert_eq!(series[1].date, day(2));
        assert!((series[1].mean_ndvi - 0.5).abs() < 1e-12);
        assert_eq!(series[1].valid_count, 4);
        assert_eq!(series[1].rasters, 2);
    }

    #[test]
    fn test_anomalies_use_absolute_change() {
        let reports = [report(0.30, 1), report(0.35, 1), report(0.10, 1), report(0.25, 1)];
        let series = daily_means(reports.iter().enumerate().map(|(i, r)| (day(i as u32 + 1), r)));

        let anomalies = detect_anomalies(&series, DEFAULT_ANOMALY_THRESHOLD);
        let dates: Vec<NaiveDate> = anomalies.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![day(3), day(4)]);
        assert!(anomalies[0].change < 0.0);
        assert!(anomalies[1].change > 0.0);
    }

    #[test]
    fn test_change_equal_to_threshold_not_flagged() {
        let reports = [report(0.25, 1), report(0.75, 1)];
        let series = daily_means([(day(1), &reports[0]), (day(2), &reports[1])]);
        assert!(detect_anomalies(&series, 0.5).is_empty());
        assert_eq!(detect_anomalies(&series, 0.25).len(), 1);
    }

    #[test]
    fn test_single_day_never_flagged() {
        let r = report(0.3, 1);
        let series = daily_means([(day(1), &r)]);
        assert!(detect_anomalies(&series, 0.0).is_empty());
    }

    #[test]
    fn test_empty_reports_skipped() {
        let empty = report(0.0, 0);
        let full = report(0.4, 2);
        let series = daily_means([(day(1), &empty), (day(2), &full)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, day(2));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(-0.00004), -0.0);
    }
}
