//! Streams a remote archive to a local file

use crate::error::DegitError;
use crate::remote::{CloneSpec, Fetcher};
use anyhow::Result;
use futures_util::StreamExt as _;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt as _;
use tracing::debug;

/// Downloads the archive snapshot described by a [`CloneSpec`]
pub struct ArchiveDownloader<'src> {
    fetcher: &'src Fetcher,
    url: String,
}

impl<'src> ArchiveDownloader<'src> {
    /// Create a downloader for `spec`, requesting archives from `base_url`
    #[must_use]
    pub fn new(fetcher: &'src Fetcher, spec: &CloneSpec, base_url: &str) -> Self {
        Self {
            fetcher,
            url: spec.archive_url(base_url),
        }
    }

    /// The archive URL this downloader requests
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stream the archive body into `path` and return the number of bytes written
    ///
    /// On failure the contents of `path` are undefined.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fetch fails (see [`Fetcher::fetch`])
    /// - The file cannot be created or written ([`DegitError::Download`])
    /// - The response body stream fails ([`DegitError::Download`])
    pub async fn download_to(&self, path: &Path) -> Result<u64> {
        let response = self.fetcher.fetch(&self.url).await?;

        let mut file = File::create(path).await.map_err(|e| {
            DegitError::download(format!("Failed to create {}: {e}", path.display()))
        })?;

        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                DegitError::download(format!("Failed reading body of {}: {e}", self.url))
            })?;
            file.write_all(&chunk).await.map_err(|e| {
                DegitError::download(format!("Failed writing {}: {e}", path.display()))
            })?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| {
            DegitError::download(format!("Failed flushing {}: {e}", path.display()))
        })?;

        debug!("Downloaded {} bytes from {} to {:?}", written, self.url, path);
        Ok(written)
    }
}
