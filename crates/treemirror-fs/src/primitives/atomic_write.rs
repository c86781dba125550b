use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Synchronous writer that replaces `path` only on [`AtomicWriter::commit`].
///
/// Content goes to a hidden temporary file next to the destination. Dropping
/// the writer without committing removes the temporary file and leaves any
/// previous content at `path` untouched.
pub struct AtomicWriter {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl AtomicWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let parent = parent_of(&path)?;

        let tmp = tempfile::Builder::new()
            .prefix(".treemirror.")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| Error::Write {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self { tmp, path })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn commit(mut self) -> Result<()> {
        self.tmp.flush().map_err(|e| Error::Write {
            path: self.path.clone(),
            source: e,
        })?;
        self.tmp.as_file().sync_all().map_err(|e| Error::Write {
            path: self.path.clone(),
            source: e,
        })?;
        self.tmp.persist(&self.path).map_err(|e| Error::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.tmp.write(buf) }

    fn flush(&mut self) -> io::Result<()> { self.tmp.flush() }
}

/// Writes `content` to `path` through an [`AtomicWriter`].
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let mut writer = AtomicWriter::create(path)?;
    writer.write_all(content).map_err(|e| Error::Write {
        path: writer.path().to_path_buf(),
        source: e,
    })?;
    writer.commit()
}

pub(crate) fn parent_of(path: &Path) -> Result<&Path> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Ok(Path::new(".")),
        Some(p) => Ok(p),
        None => Err(Error::NoParent {
            path: path.to_path_buf(),
        }),
    }
}
