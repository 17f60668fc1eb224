//! Per-load stage tracking.
//!
//! A load walks a fixed sequence of stages and ends in exactly one terminal
//! state. The tracker rejects any other transition so that a skipped or
//! repeated stage surfaces as an error instead of going unnoticed.

use std::fmt;

use ndvi_common::ErrorKind;
use thiserror::Error;

/// Stage of a single raster load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStage {
    Idle,
    Decoding,
    Scanning,
    Classifying,
    Reprojecting,
    Aggregating,
    Ready,
    Failed(ErrorKind),
}

impl LoadStage {
    /// The stage that follows a successful step, `None` for terminal and
    /// final stages.
    pub fn successor(&self) -> Option<LoadStage> {
        match self {
            LoadStage::Idle => Some(LoadStage::Decoding),
            LoadStage::Decoding => Some(LoadStage::Scanning),
            LoadStage::Scanning => Some(LoadStage::Classifying),
            LoadStage::Classifying => Some(LoadStage::Reprojecting),
            LoadStage::Reprojecting => Some(LoadStage::Aggregating),
            LoadStage::Aggregating => Some(LoadStage::Ready),
            LoadStage::Ready | LoadStage::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStage::Ready | LoadStage::Failed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStage::Idle => "idle",
            LoadStage::Decoding => "decoding",
            LoadStage::Scanning => "scanning",
            LoadStage::Classifying => "classifying",
            LoadStage::Reprojecting => "reprojecting",
            LoadStage::Aggregating => "aggregating",
            LoadStage::Ready => "ready",
            LoadStage::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStage::Failed(kind) => write!(f, "failed({})", kind),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Rejected stage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid load transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: LoadStage,
    pub to: LoadStage,
}

/// Records the stages of one load.
#[derive(Debug, Clone)]
pub struct LoadTracker {
    generation: u64,
    history: Vec<LoadStage>,
}

impl LoadTracker {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            history: vec![LoadStage::Idle],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stage(&self) -> LoadStage {
        self.history.last().copied().unwrap_or(LoadStage::Idle)
    }

    /// Every stage visited so far, starting with `Idle`.
    pub fn history(&self) -> &[LoadStage] {
        &self.history
    }

    /// Move to `to`.
    ///
    /// Allowed moves are the fixed successor of the current stage, or
    /// `Failed` from any non-terminal stage.
    pub fn transition_to(&mut self, to: LoadStage) -> Result<(), TransitionError> {
        let from = self.stage();
        let allowed = match to {
            LoadStage::Failed(_) => !from.is_terminal(),
            _ => from.successor() == Some(to),
        };
        if !allowed {
            return Err(TransitionError { from, to });
        }

        tracing::debug!(
            generation = self.generation,
            from = %from,
            to = %to,
            "Load stage transition"
        );
        self.history.push(to);
        Ok(())
    }

    /// Move to the successor of the current stage.
    pub fn advance(&mut self) -> Result<LoadStage, TransitionError> {
        let from = self.stage();
        let to = from.successor().ok_or(TransitionError {
            from,
            to: LoadStage::Ready,
        })?;
        self.transition_to(to)?;
        Ok(to)
    }

    /// Terminate the load with the given error kind.
    pub fn fail(&mut self, kind: ErrorKind) -> Result<(), TransitionError> {
        self.transition_to(LoadStage::Failed(kind))
    }
}
