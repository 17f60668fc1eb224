//! Time-series handlers over the dated rasters of the catalog.
//!
//! Each raster named after an HLS product carries an acquisition date.
//! Rasters of the same day are combined into one daily mean; the series of
//! daily means is the trend, and large day-over-day changes are anomalies.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use chrono::NaiveDate;
use metrics::counter;
use ndvi_processor::{
    daily_means, detect_anomalies, trend::round4, Anomaly, DailyMean, RasterSource, Report,
    DEFAULT_ANOMALY_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{list_rasters, RasterEntry};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// Restrict to one MGRS tile, e.g. `T11SLT`
    pub tile: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyQuery {
    pub tile: Option<String>,
    /// Absolute day-over-day change that counts as an anomaly
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// Acquisition day, `YYYY-MM-DD`
    pub date: Option<String>,
    pub tile: Option<String>,
}

/// Daily mean series, oldest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile: Option<String>,
    pub dates: Vec<NaiveDate>,
    /// Daily means rounded to four decimals
    pub mean_ndvi: Vec<f64>,
    /// Rasters that could not be processed
    pub skipped: Vec<String>,
}

/// Mean of one day's rasters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponse {
    #[serde(flatten)]
    pub day: DailyMean,
    pub paths: Vec<String>,
}

/// A processed dated raster.
struct DatedReport {
    date: NaiveDate,
    path: String,
    report: Report,
}

/// Process every dated raster matching `tile` and `date`.
///
/// Rasters the pipeline rejects are returned by path instead of failing the
/// whole request.
async fn dated_reports(
    state: &Arc<AppState>,
    tile: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<(Vec<DatedReport>, Vec<String>), ApiError> {
    let listing = {
        let state = Arc::clone(state);
        tokio::task::spawn_blocking(move || list_rasters(&state.config))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(|e| ApiError::Internal(format!("{:#}", e)))?
    };

    let selected: Vec<(NaiveDate, RasterEntry)> = listing
        .into_iter()
        .filter(|entry| tile.map_or(true, |t| entry.tile.as_deref() == Some(t)))
        .filter_map(|entry| entry.date.map(|d| (d, entry)))
        .filter(|(d, _)| date.map_or(true, |wanted| *d == wanted))
        .collect();

    let pipeline = state.pipeline();
    let mut reports = Vec::with_capacity(selected.len());
    let mut skipped = Vec::new();

    for (date, entry) in selected {
        let file = state.config.relative_path(&entry.path).to_string();
        let bytes = match state.source.fetch(&file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %entry.path, error = %e, "Skipping raster");
                skipped.push(entry.path);
                continue;
            }
        };

        let decoder = Arc::clone(&state.decoder);
        let result =
            tokio::task::spawn_blocking(move || pipeline.run_bytes(&bytes, decoder.as_ref()))
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;

        match result {
            Ok(output) => reports.push(DatedReport {
                date,
                path: entry.path,
                report: output.report,
            }),
            Err(e) => {
                warn!(path = %entry.path, kind = %e.kind(), error = %e, "Skipping raster");
                skipped.push(entry.path);
            }
        }
    }

    debug!(processed = reports.len(), skipped = skipped.len(), "Dated rasters processed");
    Ok((reports, skipped))
}

fn series(reports: &[DatedReport]) -> Vec<DailyMean> {
    daily_means(reports.iter().map(|r| (r.date, &r.report)))
}

/// GET /api/trend?tile= - Daily mean NDVI over time
pub async fn trend_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendResponse>, ApiError> {
    counter!("ndvi_http_requests_total", "endpoint" => "trend").increment(1);

    let (reports, skipped) = dated_reports(&state, query.tile.as_deref(), None).await?;
    let days = series(&reports);

    Ok(Json(TrendResponse {
        tile: query.tile,
        dates: days.iter().map(|d| d.date).collect(),
        mean_ndvi: days.iter().map(|d| round4(d.mean_ndvi)).collect(),
        skipped,
    }))
}

/// GET /api/anomalies?threshold=&tile= - Days with a large change in mean NDVI
pub async fn anomalies_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<AnomalyQuery>,
) -> Result<Json<Vec<Anomaly>>, ApiError> {
    counter!("ndvi_http_requests_total", "endpoint" => "anomalies").increment(1);

    let threshold = query.threshold.unwrap_or(DEFAULT_ANOMALY_THRESHOLD);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let (reports, _) = dated_reports(&state, query.tile.as_deref(), None).await?;
    Ok(Json(detect_anomalies(&series(&reports), threshold)))
}

/// GET /api/daily?date=&tile= - Mean NDVI of the rasters acquired on one day
pub async fn daily_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailyResponse>, ApiError> {
    counter!("ndvi_http_requests_total", "endpoint" => "daily").increment(1);

    let raw = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing required parameter: date".to_string()))?;
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ApiError::BadRequest(format!("invalid date {:?}: {}", raw, e)))?;

    let (reports, _) = dated_reports(&state, query.tile.as_deref(), Some(date)).await?;
    let day = series(&reports)
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(format!("no NDVI raster for {}", date)))?;

    Ok(Json(DailyResponse {
        day,
        paths: reports.into_iter().map(|r| r.path).collect(),
    }))
}
