//! Application state for the NDVI API.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use ndvi_processor::{AutoDecoder, FsRasterSource, Pipeline, RasterDecoder};

use crate::config::ApiConfig;
use crate::sessions::SessionRegistry;

/// Shared application state.
pub struct AppState {
    pub config: ApiConfig,

    /// One generation-guarded coordinator per client session.
    pub sessions: SessionRegistry,

    /// Raster files under `config.raster_dir`.
    pub source: FsRasterSource,

    pub decoder: Arc<dyn RasterDecoder>,

    /// Prometheus recorder handle, absent when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ApiConfig, metrics: Option<PrometheusHandle>) -> Self {
        let source = FsRasterSource::new(config.raster_dir.clone());
        let sessions = SessionRegistry::new(Pipeline::new(config.processor), config.max_sessions);

        Self {
            config,
            sessions,
            source,
            decoder: Arc::new(AutoDecoder),
            metrics,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        *self.sessions.pipeline()
    }
}
