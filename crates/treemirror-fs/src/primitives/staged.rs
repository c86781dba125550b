use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::atomic_write::parent_of;
use crate::{Error, Result};

/// An async file that only appears at its destination once committed.
///
/// Bytes are written to a hidden sibling of the destination. If the value is
/// dropped before [`StagedFile::commit`] (an error, a cancelled task), the
/// temporary file is deleted and nothing is left at the destination.
pub struct StagedFile {
    file: File,
    tmp: TempPath,
    destination: PathBuf,
    written: u64,
}

impl StagedFile {
    /// Creates the staging file. The destination's parent must exist.
    pub async fn create(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        let parent = parent_of(&destination)?.to_path_buf();

        // Creating the file is a blocking syscall; keep it off the runtime.
        let named = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".treemirror.")
                .suffix(".part")
                .tempfile_in(parent)
        })
        .await
        .map_err(io::Error::other)
        .and_then(|created| created)
        .map_err(|e| Error::Write {
            path: destination.clone(),
            source: e,
        })?;
        let (file, tmp) = named.into_parts();

        Ok(Self {
            file: File::from_std(file),
            tmp,
            destination,
            written: 0,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await.map_err(|e| Error::Write {
            path: self.destination.clone(),
            source: e,
        })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 { self.written }

    pub fn destination(&self) -> &Path { &self.destination }

    /// Flushes, syncs and renames the staging file onto the destination.
    /// Returns the number of bytes written.
    pub async fn commit(self) -> Result<u64> {
        let Self {
            mut file,
            tmp,
            destination,
            written,
        } = self;

        file.flush().await.map_err(|e| Error::Write {
            path: destination.clone(),
            source: e,
        })?;
        file.sync_all().await.map_err(|e| Error::Write {
            path: destination.clone(),
            source: e,
        })?;
        drop(file);

        let target = destination.clone();
        tokio::task::spawn_blocking(move || tmp.persist(target))
            .await
            .map_err(io::Error::other)
            .and_then(|persisted| persisted.map_err(|e| e.error))
            .map_err(|e| Error::Persist {
                path: destination,
                source: e,
            })?;
        Ok(written)
    }
}
