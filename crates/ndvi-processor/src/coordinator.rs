//! Generation-guarded load coordination.
//!
//! Every load is tagged with a generation number taken from a monotonic
//! counter. Only the result carrying the latest generation may change what
//! subscribers see; anything older is dropped when it completes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::counter;
use ndvi_common::{ErrorKind, NdviError, NdviResult};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::pipeline::{self, Pipeline, PipelineOutput};
use crate::source::{RasterDecoder, RasterSource};
use crate::state::LoadTracker;

/// A load that ended in error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub generation: u64,
    pub kind: ErrorKind,
    pub message: String,
}

/// What subscribers observe.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    /// Latest generation started
    pub generation: u64,
    /// True while the latest generation is in flight
    pub loading: bool,
    /// Output of the most recent successful load, if not cleared
    pub current: Option<Arc<PipelineOutput>>,
    /// Generation that produced `current`
    pub current_generation: Option<u64>,
    /// Error of the latest generation, if it failed
    pub last_error: Option<LoadFailure>,
}

/// How a load ended, from the caller's point of view.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Ready {
        generation: u64,
        output: Arc<PipelineOutput>,
    },
    Failed(NdviError),
    /// A newer load started before this one finished; its result was dropped.
    Superseded { generation: u64, latest: u64 },
    /// The processing task panicked or was cancelled before producing a result.
    Aborted { generation: u64, message: String },
}

/// Serializes the visible effect of concurrent loads.
pub struct LoadCoordinator {
    pipeline: Pipeline,
    generation: AtomicU64,
    state: watch::Sender<LoadState>,
}

impl LoadCoordinator {
    pub fn new(pipeline: Pipeline) -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self {
            pipeline,
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Latest generation handed out.
    pub fn latest(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest() == generation
    }

    /// Start a new load and raise the loading flag.
    pub fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            // A later begin may already have run
            if generation > state.generation {
                state.generation = generation;
                state.loading = true;
            }
        });
        counter!("ndvi_loads_total").increment(1);
        debug!(generation, "Load started");
        generation
    }

    /// Publish the result of `generation` unless a newer load exists.
    ///
    /// The check and the update happen under the channel's lock, so a stale
    /// result can never overwrite a newer one.
    pub fn complete(&self, generation: u64, result: NdviResult<PipelineOutput>) -> LoadOutcome {
        let result = result.map(Arc::new);

        let published = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.loading = false;
            match &result {
                Ok(output) => {
                    state.current = Some(Arc::clone(output));
                    state.current_generation = Some(generation);
                    state.last_error = None;
                }
                Err(e) => {
                    state.last_error = Some(LoadFailure {
                        generation,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
            true
        });

        if !published {
            let latest = self.latest();
            counter!("ndvi_stale_results_total").increment(1);
            debug!(generation, latest, "Discarding stale load result");
            return LoadOutcome::Superseded { generation, latest };
        }

        match result {
            Ok(output) => {
                info!(
                    generation,
                    valid = output.report.valid_count,
                    mean = output.report.mean,
                    "Load ready"
                );
                LoadOutcome::Ready { generation, output }
            }
            Err(e) => {
                counter!("ndvi_load_failures_total", "kind" => e.kind().as_str()).increment(1);
                warn!(generation, kind = %e.kind(), error = %e, "Load failed");
                LoadOutcome::Failed(e)
            }
        }
    }

    /// End `generation` without a result, leaving `current` untouched.
    pub fn abort(&self, generation: u64, message: impl Into<String>) -> LoadOutcome {
        let message = message.into();
        let published = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.loading = false;
            true
        });

        counter!("ndvi_load_failures_total", "kind" => "aborted").increment(1);
        error!(generation, published, error = %message, "Load aborted");
        LoadOutcome::Aborted {
            generation,
            message,
        }
    }

    /// Drop the displayed output and error.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            state.current = None;
            state.current_generation = None;
            state.last_error = None;
        });
    }

    /// Fetch, decode and process `path` as a new generation.
    ///
    /// The fetch is abandoned if a newer load has started by the time the
    /// bytes arrive. Once processing starts it runs to completion on the
    /// blocking pool and the generation check decides whether it is kept.
    pub async fn load(
        &self,
        source: &dyn RasterSource,
        decoder: Arc<dyn RasterDecoder>,
        path: &str,
    ) -> LoadOutcome {
        let generation = self.begin();
        let mut tracker = LoadTracker::new(generation);

        let bytes = match source.fetch(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                pipeline::fail(&mut tracker, &e);
                return self.complete(generation, Err(e));
            }
        };

        if !self.is_current(generation) {
            counter!("ndvi_stale_results_total").increment(1);
            debug!(generation, path, "Abandoning superseded load after fetch");
            return LoadOutcome::Superseded {
                generation,
                latest: self.latest(),
            };
        }

        let pipeline = self.pipeline;
        let task = tokio::task::spawn_blocking(move || {
            pipeline.run_tracked(&bytes, decoder.as_ref(), &mut tracker)
        });

        match task.await {
            Ok(result) => self.complete(generation, result),
            Err(e) => self.abort(generation, format!("pipeline task failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_common::{BoundingBox, RasterGrid};

    fn output() -> PipelineOutput {
        let grid = RasterGrid::new(
            1,
            1,
            vec![0.4],
            "EPSG:4326",
            BoundingBox::new(10.0, 20.0, 11.0, 21.0),
        )
        .unwrap();
        Pipeline::default().run(&grid).unwrap()
    }

    #[test]
    fn test_begin_raises_loading() {
        let coordinator = LoadCoordinator::new(Pipeline::default());
        let generation = coordinator.begin();
        assert_eq!(generation, 1);
        let state = coordinator.state();
        assert!(state.loading);
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn test_stale_result_discarded() {
        let coordinator = LoadCoordinator::new(Pipeline::default());
        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(matches!(
            coordinator.complete(second, Ok(output())),
            LoadOutcome::Ready { .. }
        ));
        let shown = coordinator.state().current.unwrap();

        let outcome = coordinator.complete(first, Ok(output()));
        assert!(matches!(
            outcome,
            LoadOutcome::Superseded { generation: 1, latest: 2 }
        ));
        assert!(Arc::ptr_eq(&coordinator.state().current.unwrap(), &shown));
    }

    #[test]
    fn test_failure_keeps_previous_output() {
        let coordinator = LoadCoordinator::new(Pipeline::default());
        let g1 = coordinator.begin();
        coordinator.complete(g1, Ok(output()));

        let g2 = coordinator.begin();
        let outcome = coordinator.complete(g2, Err(NdviError::no_valid_samples("empty")));
        assert!(matches!(outcome, LoadOutcome::Failed(NdviError::NoValidSamples(_))));

        let state = coordinator.state();
        assert!(!state.loading);
        assert!(state.current.is_some());
        assert_eq!(state.last_error.unwrap().kind, ErrorKind::NoValidSamples);
    }

    #[test]
    fn test_clear() {
        let coordinator = LoadCoordinator::new(Pipeline::default());
        let g = coordinator.begin();
        coordinator.complete(g, Ok(output()));
        assert_eq!(coordinator.state().current_generation, Some(g));
        coordinator.clear();
        assert!(coordinator.state().current.is_none());
        assert_eq!(coordinator.state().current_generation, None);
    }

    #[test]
    fn test_abort_clears_loading_only() {
        let coordinator = LoadCoordinator::new(Pipeline::default());
        let g1 = coordinator.begin();
        coordinator.complete(g1, Ok(output()));

        let g2 = coordinator.begin();
        let outcome = coordinator.abort(g2, "worker panicked");
        assert!(matches!(outcome, LoadOutcome::Aborted { generation: 2, .. }));

        let state = coordinator.state();
        assert!(!state.loading);
        assert_eq!(state.current_generation, Some(g1));
        assert!(state.last_error.is_none());
    }
}
