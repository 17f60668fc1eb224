//! Service configuration.
//!
//! Values come from defaults, then an optional YAML file, then environment
//! variables, each layer overriding the previous one.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ndvi_processor::ProcessorConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the NDVI API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Directory holding the raster files.
    pub raster_dir: PathBuf,

    /// Only files whose name starts with this are listed.
    pub file_prefix: String,

    /// Accepted file extensions, without the dot.
    pub extensions: Vec<String>,

    /// URL prefix under which listed rasters are addressed.
    pub static_prefix: String,

    /// Client sessions kept before the least recently used is dropped.
    pub max_sessions: usize,

    /// Pipeline settings.
    pub processor: ProcessorConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            raster_dir: PathBuf::from("output/web/ndvi_rasters"),
            file_prefix: "NDVI_".to_string(),
            extensions: vec!["ndvg".to_string(), "json".to_string()],
            static_prefix: "/static/ndvi_rasters".to_string(),
            max_sessions: 256,
            processor: ProcessorConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration, reading `path` first when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("NDVI_RASTER_DIR") {
            self.raster_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("NDVI_FILE_PREFIX") {
            self.file_prefix = val;
        }
        if let Ok(val) = std::env::var("NDVI_FILE_EXTENSIONS") {
            self.extensions = parse_extensions(&val);
        }
        if let Ok(val) = std::env::var("NDVI_STATIC_PREFIX") {
            self.static_prefix = val;
        }
        if let Ok(val) = std::env::var("NDVI_MAX_SESSIONS") {
            if let Ok(max) = val.parse() {
                self.max_sessions = max;
            }
        }
        if let Ok(val) = std::env::var("NDVI_MAX_SAMPLES") {
            if let Ok(max) = val.parse() {
                self.processor.max_samples = max;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            bail!("at least one raster file extension is required");
        }
        if !self.static_prefix.starts_with('/') || self.static_prefix.trim_end_matches('/').is_empty() {
            bail!("static_prefix must be a non-root path starting with '/': {}", self.static_prefix);
        }
        if self.max_sessions == 0 {
            bail!("max_sessions must be at least 1");
        }
        self.processor
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid processor config: {}", e))?;
        Ok(())
    }

    /// Whether `name` has one of the accepted extensions.
    pub fn has_raster_extension(&self, name: &str) -> bool {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    /// Public URL path of a raster file.
    pub fn public_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.static_prefix.trim_end_matches('/'), file_name)
    }

    /// Inverse of [`public_path`](Self::public_path); plain file names pass
    /// through unchanged.
    pub fn relative_path<'a>(&self, path: &'a str) -> &'a str {
        let prefix = self.static_prefix.trim_end_matches('/');
        path.strip_prefix(prefix)
            .unwrap_or(path)
            .trim_start_matches('/')
    }
}

/// Split a comma-separated extension list, dropping dots and blanks.
fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.file_prefix, "NDVI_");
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("ndvg, .json,,"), vec!["ndvg", "json"]);
        assert!(parse_extensions(" , ").is_empty());
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = "raster_dir: /data/ndvi\nextensions: [ndvg]\nprocessor:\n  max_samples: 5000\n";
        let config: ApiConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.raster_dir, PathBuf::from("/data/ndvi"));
        assert_eq!(config.extensions, vec!["ndvg"]);
        assert_eq!(config.processor.max_samples, 5000);
        assert_eq!(config.static_prefix, "/static/ndvi_rasters");
        assert_eq!(config.max_sessions, 256);
    }

    #[test]
    fn test_validate_rejects_zero_sessions() {
        let config = ApiConfig {
            max_sessions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let config = ApiConfig {
            static_prefix: "static".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            static_prefix: "/".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extension_match() {
        let config = ApiConfig::default();
        assert!(config.has_raster_extension("NDVI_a.ndvg"));
        assert!(config.has_raster_extension("NDVI_a.JSON"));
        assert!(!config.has_raster_extension("NDVI_a.tif"));
        assert!(!config.has_raster_extension("NDVI_a"));
    }

    #[test]
    fn test_public_and_relative_paths() {
        let config = ApiConfig::default();
        let public = config.public_path("NDVI_a.ndvg");
        assert_eq!(public, "/static/ndvi_rasters/NDVI_a.ndvg");
        assert_eq!(config.relative_path(&public), "NDVI_a.ndvg");
        assert_eq!(config.relative_path("NDVI_a.ndvg"), "NDVI_a.ndvg");
    }
}
