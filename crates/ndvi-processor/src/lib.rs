//! Raster-to-visualization pipeline for vegetation-index grids.
//!
//! Turns a decoded raster into a color-classified image, a geographic
//! bounding box and summary statistics. Every numeric stage is a pure,
//! synchronous transformation of the previous stage's output; only the
//! retrieval of raw bytes suspends.
//!
//! # Architecture
//!
//! ```text
//! RasterSource::fetch(path)          (async, the only suspension point)
//!      │
//!      ▼
//! RasterDecoder::decode(bytes) ──► RasterGrid
//!      │
//!      ├─► scan()       validity + scale factor + raw extrema
//!      ├─► classify()   ClassifiedImage + per-category counts
//!      ├─► reproject()  CornerSet in lat/lon
//!      ├─► estimate_area_km2()
//!      └─► aggregate()  Report
//!               │
//!               ▼
//! LoadCoordinator (generation check) ──► watch::Receiver<LoadState>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ndvi_processor::{AutoDecoder, FsRasterSource, LoadCoordinator, Pipeline};
//!
//! let coordinator = LoadCoordinator::new(Pipeline::default());
//! let source = FsRasterSource::new("output/web/ndvi_rasters");
//! let decoder = Arc::new(AutoDecoder::default());
//!
//! let outcome = coordinator.load(&source, decoder, "NDVI_T10SFE.ndvg").await;
//! ```

pub mod area;
pub mod classify;
pub mod config;
pub mod coordinator;
pub mod pipeline;
pub mod reproject;
pub mod scan;
pub mod source;
pub mod state;
pub mod stats;
pub mod trend;
pub mod validity;

// Re-export commonly used types at crate root
pub use area::{estimate_area_km2, EARTH_RADIUS_KM};
pub use classify::{classify, Classification};
pub use config::ProcessorConfig;
pub use coordinator::{LoadCoordinator, LoadFailure, LoadOutcome, LoadState};
pub use pipeline::{Pipeline, PipelineOutput};
pub use reproject::{reproject, CornerSet};
pub use scan::{scan, ScaleFactor, ScanResult};
pub use source::{
    encode_ndvg, AutoDecoder, BinaryGridDecoder, FsRasterSource, HttpRasterSource,
    JsonGridDecoder, RasterDecoder, RasterSource, SampleType,
};
pub use state::{LoadStage, LoadTracker, TransitionError};
pub use stats::{aggregate, Report};
pub use trend::{daily_means, detect_anomalies, Anomaly, DailyMean, DEFAULT_ANOMALY_THRESHOLD};
pub use validity::is_valid_sample;
