use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{ChartError, ChartResult};

/// Source of raw bundle bytes for a URL.
///
/// Retrieval is the host's concern; implementations map every transfer
/// failure to `ChartError::Network`.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ChartResult<Vec<u8>>;
}

#[async_trait]
impl<F: BlobFetcher + ?Sized> BlobFetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> ChartResult<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// Reads bundles from the local filesystem.
///
/// Accepts plain paths and `file://` URLs, optionally relative to a root.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl BlobFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> ChartResult<Vec<u8>> {
        let path = self.resolve(url);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ChartError::Network(format!("cannot read {}: {e}", path.display())))
    }
}

/// In-memory URL → bytes table for embedded bundles and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    blobs: Arc<RwLock<IndexMap<String, Arc<[u8]>>>>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_blob(self, url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.blobs.write().insert(url.into(), bytes.into());
    }

    pub fn remove(&self, url: &str) -> bool {
        self.blobs.write().shift_remove(url).is_some()
    }
}

#[async_trait]
impl BlobFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> ChartResult<Vec<u8>> {
        let blob = self.blobs.read().get(url).cloned();
        blob.map(|bytes| bytes.to_vec())
            .ok_or_else(|| ChartError::Network(format!("no blob registered for {url}")))
    }
}

/// Fetches bundles over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl BlobFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ChartResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChartError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ChartError::Network(format!(
                "HTTP {} for {url}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ChartError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
