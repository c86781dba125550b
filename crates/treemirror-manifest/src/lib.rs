//! SHA-256 manifests of mirrored directory trees.
//!
//! A manifest is a CSV file with the header `file_path,sha256_hash` and one
//! row per regular file, in directory-walk order. Walk order is sorted by
//! file name, so building twice over an unchanged tree yields identical
//! bytes.

mod builder;
mod check;
mod error;
mod record;

pub use builder::{DEFAULT_MANIFEST_NAME, ManifestBuilder};
pub use check::{CheckReport, Mismatch, check};
pub use error::{ManifestError, Result};
pub use record::{HEADER, ManifestRecord, read_manifest};
