//! Load coordination across concurrent and failing loads.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use ndvi_common::{ErrorKind, NdviResult, RasterGrid};
use ndvi_processor::{
    encode_ndvg, AutoDecoder, FsRasterSource, LoadCoordinator, LoadOutcome, Pipeline,
    ProcessorConfig, RasterDecoder, RasterSource, SampleType,
};
use test_utils::{geographic_grid, scaled_grid_with_nodata, RasterDir};
use tokio::sync::Notify;

/// Holds back one path until released.
struct GatedSource {
    inner: FsRasterSource,
    slow_path: &'static str,
    gate: Arc<Notify>,
}

#[async_trait]
impl RasterSource for GatedSource {
    async fn fetch(&self, path: &str) -> NdviResult<Bytes> {
        if path == self.slow_path {
            self.gate.notified().await;
        }
        self.inner.fetch(path).await
    }
}

/// Decoder whose worker dies mid-load.
struct PanickingDecoder;

impl RasterDecoder for PanickingDecoder {
    fn decode(&self, _bytes: &[u8], _config: &ProcessorConfig) -> NdviResult<RasterGrid> {
        panic!("decoder crashed");
    }
}

fn raster_dir() -> RasterDir {
    let dir = RasterDir::new();
    let slow = encode_ndvg(&scaled_grid_with_nodata(), SampleType::I16).unwrap();
    dir.write("NDVI_slow.ndvg", &slow);
    let fast = geographic_grid(2, 1, vec![0.6, 0.7]);
    dir.write("NDVI_fast.ndvg", &encode_ndvg(&fast, SampleType::F64).unwrap());
    dir.write("NDVI_empty.json", br#"{"width":1,"height":1,"crs":"EPSG:4326",
        "xmin":1.0,"ymin":2.0,"xmax":3.0,"ymax":4.0,"samples":[0]}"#);
    dir
}

fn decoder() -> Arc<dyn RasterDecoder> {
    Arc::new(AutoDecoder)
}

// ============================================================================
// Stale results
// ============================================================================

#[tokio::test]
async fn test_stale_load_does_not_overwrite_newer() {
    let dir = raster_dir();
    let gate = Arc::new(Notify::new());
    let source = Arc::new(GatedSource {
        inner: FsRasterSource::new(dir.path()),
        slow_path: "NDVI_slow.ndvg",
        gate: gate.clone(),
    });
    let coordinator = Arc::new(LoadCoordinator::new(Pipeline::default()));

    let slow = tokio::spawn({
        let coordinator = coordinator.clone();
        let source = source.clone();
        async move {
            coordinator
                .load(source.as_ref(), decoder(), "NDVI_slow.ndvg")
                .await
        }
    });

    while coordinator.latest() < 1 {
        tokio::task::yield_now().await;
    }

    let fast = coordinator
        .load(source.as_ref(), decoder(), "NDVI_fast.ndvg")
        .await;
    let fast = match fast {
        LoadOutcome::Ready { generation, output } => {
            assert_eq!(generation, 2);
            output
        }
        other => panic!("expected ready, got {:?}", other),
    };
    assert_eq!(fast.report.valid_count, 2);

    gate.notify_one();
    let slow = slow.await.unwrap();
    assert!(matches!(
        slow,
        LoadOutcome::Superseded { generation: 1, latest: 2 }
    ));

    let state = coordinator.state();
    assert!(!state.loading);
    assert_eq!(state.generation, 2);
    assert!(Arc::ptr_eq(state.current.as_ref().unwrap(), &fast));
}

#[tokio::test]
async fn test_late_result_for_old_generation_is_dropped() {
    let coordinator = LoadCoordinator::new(Pipeline::default());
    let old = coordinator.begin();
    let new = coordinator.begin();

    let output = Pipeline::default().run(&scaled_grid_with_nodata()).unwrap();
    let outcome = coordinator.complete(old, Ok(output));

    assert!(matches!(outcome, LoadOutcome::Superseded { .. }));
    let state = coordinator.state();
    assert_eq!(state.generation, new);
    assert!(state.loading, "newer load is still in flight");
    assert!(state.current.is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_missing_file_is_retrieval_failure() {
    let dir = raster_dir();
    let source = FsRasterSource::new(dir.path());
    let coordinator = LoadCoordinator::new(Pipeline::default());

    let outcome = coordinator.load(&source, decoder(), "NDVI_missing.ndvg").await;
    match outcome {
        LoadOutcome::Failed(e) => assert_eq!(e.kind(), ErrorKind::Retrieval),
        other => panic!("expected failure, got {:?}", other),
    }

    let state = coordinator.state();
    assert!(!state.loading);
    assert_eq!(state.last_error.unwrap().kind, ErrorKind::Retrieval);
}

#[tokio::test]
async fn test_failure_keeps_previous_output_visible() {
    let dir = raster_dir();
    let source = FsRasterSource::new(dir.path());
    let coordinator = LoadCoordinator::new(Pipeline::default());

    let first = coordinator.load(&source, decoder(), "NDVI_fast.ndvg").await;
    assert!(matches!(first, LoadOutcome::Ready { .. }));

    let second = coordinator.load(&source, decoder(), "NDVI_empty.json").await;
    match second {
        LoadOutcome::Failed(e) => assert_eq!(e.kind(), ErrorKind::NoValidSamples),
        other => panic!("expected failure, got {:?}", other),
    }

    let state = coordinator.state();
    assert_eq!(state.current.unwrap().report.valid_count, 2);
    let failure = state.last_error.unwrap();
    assert_eq!(failure.generation, 2);
    assert_eq!(failure.kind, ErrorKind::NoValidSamples);

    coordinator.clear();
    assert!(coordinator.state().current.is_none());
}

#[tokio::test]
async fn test_crashed_worker_is_aborted_not_decode_failure() {
    let dir = raster_dir();
    let source = FsRasterSource::new(dir.path());
    let coordinator = LoadCoordinator::new(Pipeline::default());

    let first = coordinator.load(&source, decoder(), "NDVI_fast.ndvg").await;
    assert!(matches!(first, LoadOutcome::Ready { .. }));

    let outcome = coordinator
        .load(&source, Arc::new(PanickingDecoder), "NDVI_fast.ndvg")
        .await;
    match outcome {
        LoadOutcome::Aborted {
            generation,
            message,
        } => {
            assert_eq!(generation, 2);
            assert!(message.contains("pipeline task failed"));
        }
        other => panic!("expected abort, got {:?}", other),
    }

    let state = coordinator.state();
    assert!(!state.loading);
    assert!(state.last_error.is_none());
    assert_eq!(state.current_generation, Some(1));
}

// ============================================================================
// Subscription
// ============================================================================

#[tokio::test]
async fn test_subscriber_sees_loading_cleared() {
    let dir = raster_dir();
    let source = FsRasterSource::new(dir.path());
    let coordinator = LoadCoordinator::new(Pipeline::default());
    let mut rx = coordinator.subscribe();

    let generation = coordinator.begin();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().loading);

    let bytes = source.fetch("NDVI_fast.ndvg").await.unwrap();
    let result = coordinator.pipeline().run_bytes(&bytes, &AutoDecoder);
    coordinator.complete(generation, result);

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(!state.loading);
    assert_eq!(state.current.unwrap().report.total_count, 2);
}
