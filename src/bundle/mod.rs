//! Session bundle access: fetching the archive and decoding its entries.

mod fetch;
mod writer;

use std::io::{Cursor, Read};
use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{ChartError, ChartResult};

pub use fetch::{BlobFetcher, FileFetcher, MemoryFetcher};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use writer::{BundleWriter, ChartOptions};

/// Decoded bytes per cooperative yield in [`ArchiveBundle::entry`].
pub const DECODE_YIELD_BYTES: usize = 64 * 1024;

/// Read-only view over one fetched session archive.
///
/// Cloning is cheap: clones share the archive bytes and the entry index, so
/// concurrent chart tasks can decode entries independently.
#[derive(Debug, Clone)]
pub struct ArchiveBundle {
    bytes: Arc<[u8]>,
    names: Arc<IndexSet<String>>,
}

impl ArchiveBundle {
    /// Validates the archive container and indexes its entry names.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> ChartResult<Self> {
        let bytes = bytes.into();
        let names: IndexSet<String> = {
            let archive = ZipArchive::new(Cursor::new(&bytes[..]))
                .map_err(|e| ChartError::Format(format!("not a zip archive: {e}")))?;
            archive
                .file_names()
                .filter(|name| !name.ends_with('/'))
                .map(str::to_owned)
                .collect()
        };
        debug!(bytes = bytes.len(), entries = names.len(), "indexed bundle");
        Ok(Self {
            bytes,
            names: Arc::new(names),
        })
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Decompresses one entry. Every call decodes from the archive bytes.
    pub fn entry_bytes(&self, name: &str) -> ChartResult<Vec<u8>> {
        if !self.names.contains(name) {
            return Err(ChartError::NotFound(name.to_owned()));
        }

        let mut archive = ZipArchive::new(Cursor::new(&self.bytes[..]))
            .map_err(|e| ChartError::Format(format!("not a zip archive: {e}")))?;
        let mut file = archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => ChartError::NotFound(name.to_owned()),
            other => ChartError::Decode {
                entry: name.to_owned(),
                reason: other.to_string(),
            },
        })?;

        let mut buffer = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut buffer)
            .map_err(|e| ChartError::Decode {
                entry: name.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(buffer)
    }

    /// Decodes one entry as UTF-8 text.
    ///
    /// Yields to the scheduler before decoding, and once more per
    /// `DECODE_YIELD_BYTES` of decoded output, so sibling chart tasks
    /// interleave on a single-threaded executor and small entries are not
    /// held behind large ones.
    pub async fn entry(&self, name: &str) -> ChartResult<String> {
        tokio::task::yield_now().await;
        let bytes = self.entry_bytes(name)?;
        for _ in 0..bytes.len() / DECODE_YIELD_BYTES {
            tokio::task::yield_now().await;
        }
        String::from_utf8(bytes).map_err(|e| ChartError::Decode {
            entry: name.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// Fetches bundles through a [`BlobFetcher`].
#[derive(Debug, Clone)]
pub struct ArchiveLoader<F> {
    fetcher: F,
}

impl<F: BlobFetcher> ArchiveLoader<F> {
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches `url` and opens it as a bundle.
    ///
    /// Transfer failures surface as `Network`, undecodable containers as
    /// `Format`.
    pub async fn fetch(&self, url: &str) -> ChartResult<ArchiveBundle> {
        let bytes = self.fetcher.fetch(url).await?;
        debug!(url, bytes = bytes.len(), "fetched bundle");
        ArchiveBundle::from_bytes(bytes)
    }
}
