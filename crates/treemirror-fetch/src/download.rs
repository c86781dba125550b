use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use treemirror_fs::StagedFile;

use crate::error::{FetchError, Result};
use crate::gate::ConcurrencyGate;
use crate::http::HttpClient;
use crate::remote::RemoteRef;

/// Default size of each write to the destination file.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Streams a single remote file to a local path.
///
/// The destination is staged next to its final location and only renamed
/// into place once the whole body has been written, so a failed download
/// leaves nothing behind. No retries are attempted.
pub struct Downloader<C> {
    client: Arc<C>,
    gate: ConcurrencyGate,
    chunk_size: usize,
}

impl<C> Clone for Downloader<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            gate: self.gate.clone(),
            chunk_size: self.chunk_size,
        }
    }
}

impl<C: HttpClient> Downloader<C> {
    pub fn new(client: Arc<C>, gate: ConcurrencyGate) -> Self {
        Self {
            client,
            gate,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the write chunk size. Zero is treated as one byte.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn gate(&self) -> &ConcurrencyGate { &self.gate }

    /// Download `remote` into `destination`, returning the bytes written.
    ///
    /// The parent of `destination` must exist. Connection failures return
    /// before anything is created locally.
    pub async fn fetch(&self, remote: &RemoteRef, destination: &Path) -> Result<u64> {
        let url = remote.url();
        let _permit = self.gate.acquire().await;

        let mut stream = self
            .client
            .stream(&url)
            .await
            .map_err(|e| FetchError::connection(&url, e))?;

        let mut staged = StagedFile::create(destination).await?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::interrupted(&url, e))?;
            for piece in chunk.chunks(self.chunk_size) {
                staged.write(piece).await?;
            }
        }

        let written = staged.commit().await?;
        tracing::info!(url = %url, path = %destination.display(), bytes = written, "downloaded file");
        Ok(written)
    }
}
