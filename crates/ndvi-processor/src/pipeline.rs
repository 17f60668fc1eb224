//! The raster-to-visualization pipeline.

use std::time::Instant;

use metrics::histogram;
use ndvi_common::{ClassifiedImage, NdviResult, RasterGrid};
use tracing::{debug, error};

use crate::area::estimate_area_km2;
use crate::classify::classify;
use crate::config::ProcessorConfig;
use crate::reproject::{reproject, CornerSet};
use crate::scan::scan;
use crate::source::RasterDecoder;
use crate::state::LoadTracker;
use crate::stats::{aggregate, Report};

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub classified_image: ClassifiedImage,
    pub bounds: CornerSet,
    pub report: Report,
}

/// Runs the numeric stages over one raster.
///
/// Holds no per-load state; the same pipeline can serve any number of
/// concurrent loads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    config: ProcessorConfig,
}

impl Pipeline {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Run every stage after decoding on an already decoded grid.
    pub fn run(&self, grid: &RasterGrid) -> NdviResult<PipelineOutput> {
        let mut tracker = LoadTracker::new(0);
        enter_next(&mut tracker);
        self.finish(grid, &mut tracker)
    }

    /// Decode `bytes` and run the full pipeline.
    pub fn run_bytes(
        &self,
        bytes: &[u8],
        decoder: &dyn RasterDecoder,
    ) -> NdviResult<PipelineOutput> {
        self.run_tracked(bytes, decoder, &mut LoadTracker::new(0))
    }

    /// Decode and process `bytes`, recording every stage in `tracker`.
    ///
    /// On error the tracker ends in `Failed` with the error's kind.
    pub fn run_tracked(
        &self,
        bytes: &[u8],
        decoder: &dyn RasterDecoder,
        tracker: &mut LoadTracker,
    ) -> NdviResult<PipelineOutput> {
        enter_next(tracker);
        let grid = match decoder.decode(bytes, &self.config) {
            Ok(grid) => grid,
            Err(e) => {
                fail(tracker, &e);
                return Err(e);
            }
        };
        self.finish(&grid, tracker)
    }

    fn finish(&self, grid: &RasterGrid, tracker: &mut LoadTracker) -> NdviResult<PipelineOutput> {
        let start = Instant::now();
        let result = self.process(grid, tracker);
        histogram!("ndvi_pipeline_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => enter_next(tracker),
            Err(e) => fail(tracker, e),
        }
        result
    }

    /// Scanning through aggregating. Leaves the tracker in `Aggregating`
    /// on success.
    fn process(&self, grid: &RasterGrid, tracker: &mut LoadTracker) -> NdviResult<PipelineOutput> {
        enter_next(tracker);
        let scanned = scan(grid)?;

        enter_next(tracker);
        let classification = classify(grid, scanned.scale_factor);

        enter_next(tracker);
        let bounds = reproject(grid.extent(), grid.crs())?;
        let area_km2 = estimate_area_km2(&bounds);

        enter_next(tracker);
        let report = aggregate(&scanned, &classification, bounds, area_km2, grid);

        debug!(
            generation = tracker.generation(),
            valid = report.valid_count,
            total = report.total_count,
            mean = report.mean,
            area_km2 = report.area_km2,
            "Pipeline stages complete"
        );

        Ok(PipelineOutput {
            classified_image: classification.image,
            bounds,
            report,
        })
    }
}

fn enter_next(tracker: &mut LoadTracker) {
    if let Err(e) = tracker.advance() {
        error!(generation = tracker.generation(), error = %e, "Pipeline stage out of order");
    }
}

/// Move the tracker to `failed`, logging a transition out of a terminal stage.
pub(crate) fn fail(tracker: &mut LoadTracker, err: &ndvi_common::NdviError) {
    if let Err(e) = tracker.fail(err.kind()) {
        error!(generation = tracker.generation(), error = %e, "Pipeline failure after terminal stage");
    }
}
