//! Local filesystem primitives for mirrored trees.
//!
//! - [`StagedFile`] - async writes that land at their destination only on commit
//! - [`AtomicWriter`] - the synchronous counterpart, used for whole-file outputs
//! - [`ensure_dir`] - idempotent directory creation, safe to race
//! - [`entry_name`] - validates a remote-derived name as one path component

mod error;
mod primitives;

pub use error::{Error, Result};
pub use primitives::{AtomicWriter, StagedFile, atomic_write};

use std::path::{Component, Path};

/// Creates `path` and any missing parents. Succeeds if it already exists.
pub async fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::CreateDir {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Returns `name` if it is exactly one normal path component.
///
/// Rejects empty names, `.`, `..`, absolute paths and anything containing a
/// separator, so a joined path can never leave its parent directory.
pub fn entry_name(name: &str) -> Result<&str> {
    let invalid = || Error::InvalidName {
        name: name.to_string(),
    };

    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(invalid()),
    }
}
