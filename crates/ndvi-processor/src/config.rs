//! Configuration for the pipeline.

use serde::{Deserialize, Serialize};

/// Configuration for the raster pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Largest grid (width × height) a decoder will accept.
    pub max_samples: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_samples: 100_000_000,
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NDVI_MAX_SAMPLES") {
            if let Ok(max) = val.parse() {
                config.max_samples = max;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_samples == 0 {
            return Err("max_samples must be > 0".to_string());
        }
        Ok(())
    }
}
