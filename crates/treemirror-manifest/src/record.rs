use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};

/// Column names of the manifest, in order.
pub const HEADER: [&str; 2] = ["file_path", "sha256_hash"];

/// One manifest row: a local file and the hex SHA-256 of its content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub file_path: PathBuf,
    #[serde(rename = "sha256_hash")]
    pub content_hash: String,
}

/// Reads every record of the manifest at `path`.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestRecord>> {
    let path = path.as_ref();
    let read_err = |source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<ManifestRecord>, _>>()
        .map_err(read_err)
}
