//! Raster retrieval and decoding.
//!
//! Fetching raw bytes is the only asynchronous step of a load. Decoding is
//! synchronous and pluggable through [`RasterDecoder`].

mod decode;

pub use decode::{encode_ndvg, AutoDecoder, BinaryGridDecoder, JsonGridDecoder, RasterDecoder, SampleType};

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ndvi_common::{NdviError, NdviResult};
use reqwest::Client;
use tracing::{debug, instrument};

/// Anything that can hand over the raw bytes of a named raster.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Fetch the raster at `path`. Fails with `Retrieval` when the bytes
    /// are unavailable.
    async fn fetch(&self, path: &str) -> NdviResult<Bytes>;
}

/// Rasters stored under a local directory.
#[derive(Debug, Clone)]
pub struct FsRasterSource {
    root: PathBuf,
}

impl FsRasterSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, refusing anything that could escape it.
    pub fn resolve(&self, path: &str) -> NdviResult<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty() {
            return Err(NdviError::retrieval("empty raster path"));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(NdviError::retrieval(format!(
                        "raster path must be relative and stay inside the raster directory: {}",
                        path
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl RasterSource for FsRasterSource {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn fetch(&self, path: &str) -> NdviResult<Bytes> {
        let full = self.resolve(path)?;
        let data = tokio::fs::read(&full)
            .await
            .map_err(|e| NdviError::retrieval(format!("{}: {}", full.display(), e)))?;

        debug!(size = data.len(), "Read raster from disk");
        Ok(Bytes::from(data))
    }
}

/// Rasters served over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpRasterSource {
    client: Client,
    base_url: String,
}

impl HttpRasterSource {
    pub fn new(base_url: impl Into<String>) -> NdviResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| NdviError::retrieval(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RasterSource for HttpRasterSource {
    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> NdviResult<Bytes> {
        let url = self.url_for(path);
        debug!(url = %url, "Downloading raster");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NdviError::retrieval(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(NdviError::retrieval(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NdviError::retrieval(format!("{}: {}", url, e)))?;

        debug!(size = bytes.len(), "Downloaded raster");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_escape() {
        let source = FsRasterSource::new("/data/rasters");
        assert!(source.resolve("../etc/passwd").is_err());
        assert!(source.resolve("a/../../b").is_err());
        assert!(source.resolve("/etc/passwd").is_err());
        assert!(source.resolve("").is_err());
    }

    #[test]
    fn test_resolve_joins_relative() {
        let source = FsRasterSource::new("/data/rasters");
        assert_eq!(
            source.resolve("NDVI_T10SFE.ndvg").unwrap(),
            PathBuf::from("/data/rasters/NDVI_T10SFE.ndvg")
        );
        assert_eq!(
            source.resolve("2024/NDVI_a.json").unwrap(),
            PathBuf::from("/data/rasters/2024/NDVI_a.json")
        );
    }

    #[test]
    fn test_url_for_joins_once() {
        let source = HttpRasterSource::with_client(Client::new(), "http://host/static/");
        assert_eq!(source.url_for("/NDVI_a.ndvg"), "http://host/static/NDVI_a.ndvg");
        assert_eq!(source.url_for("NDVI_a.ndvg"), "http://host/static/NDVI_a.ndvg");
    }
}
