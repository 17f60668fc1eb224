//! Raster listing and display labels.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ApiConfig;

/// Marker preceding the tile id in HLS Sentinel-2 product names.
const HLS_S30_MARKER: &str = "NDVI_HLS.S30.";

/// A raster offered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterEntry {
    /// URL path of the raster file
    pub path: String,
    /// Human-readable name
    pub label: String,
    /// MGRS tile, when the name carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile: Option<String>,
    /// Acquisition date, when the name carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Tile and acquisition day parsed from an HLS product name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlsName<'a> {
    /// MGRS tile, e.g. `T11SLT`
    pub tile: &'a str,
    /// Year and day of year, `YYYYDDD`
    pub date_code: &'a str,
}

impl HlsName<'_> {
    /// Display label, `"<tile> on <YYYYDDD>"`.
    pub fn label(&self) -> String {
        format!("{} on {}", self.tile, self.date_code)
    }

    /// Calendar date of the `YYYYDDD` code.
    pub fn date(&self) -> Option<NaiveDate> {
        let year: i32 = self.date_code[..4].parse().ok()?;
        let ordinal: u32 = self.date_code[4..].parse().ok()?;
        NaiveDate::from_yo_opt(year, ordinal)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse `...NDVI_HLS.S30.<tile>.<YYYYDDD>T...` out of a file name.
///
/// The tile must start with `T` and the date code must be exactly seven
/// digits followed by `T`.
pub fn parse_hls_name(file_name: &str) -> Option<HlsName<'_>> {
    let start = file_name.find(HLS_S30_MARKER)? + HLS_S30_MARKER.len();
    let rest = &file_name[start..];

    let (tile, rest) = rest.split_once('.')?;
    if tile.len() < 2 || !tile.starts_with('T') || !tile.chars().all(is_word_char) {
        return None;
    }

    let date_code = rest.get(..7)?;
    if !date_code.bytes().all(|b| b.is_ascii_digit()) || rest[7..].chars().next() != Some('T') {
        return None;
    }

    Some(HlsName { tile, date_code })
}

/// Label for a raster file; the file name itself when it is not an HLS product.
pub fn label_for(file_name: &str) -> String {
    parse_hls_name(file_name)
        .map(|name| name.label())
        .unwrap_or_else(|| file_name.to_string())
}

/// List the rasters in the configured directory, sorted by file name.
pub fn list_rasters(config: &ApiConfig) -> Result<Vec<RasterEntry>> {
    let dir: &Path = &config.raster_dir;
    let mut names = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with(&config.file_prefix) && config.has_raster_extension(name) {
            names.push(name.to_string());
        }
    }
    names.sort();

    debug!(dir = %dir.display(), count = names.len(), "Listed rasters");

    Ok(names
        .into_iter()
        .map(|name| {
            let hls = parse_hls_name(&name);
            RasterEntry {
                path: config.public_path(&name),
                label: hls.as_ref().map(|h| h.label()).unwrap_or_else(|| name.clone()),
                tile: hls.as_ref().map(|h| h.tile.to_string()),
                date: hls.and_then(|h| h.date()),
            }
        })
        .collect())
}
