use std::io;
use std::path::PathBuf;

use treemirror_verify::{Digest, VerifyError};

use crate::error::{ManifestError, Result};
use crate::record::ManifestRecord;

/// A listed file whose current content no longer matches its recorded hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
}

/// Result of re-hashing every file named by a manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub checked: usize,
    pub mismatched: Vec<Mismatch>,
    pub missing: Vec<PathBuf>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool { self.mismatched.is_empty() && self.missing.is_empty() }
}

/// Re-hashes each listed file and compares it with the recorded hash.
///
/// Files that no longer exist are reported as missing. A recorded hash that
/// is not a valid SHA-256 digest, or a file that exists but cannot be read,
/// fails the check.
pub fn check(records: &[ManifestRecord]) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    for record in records {
        let expected: Digest = record.content_hash.parse().map_err(ManifestError::Hash)?;

        let actual = match treemirror_verify::digest_file(&record.file_path) {
            Ok(digest) => digest,
            Err(VerifyError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %record.file_path.display(), "listed file is missing");
                report.missing.push(record.file_path.clone());
                continue;
            }
            Err(e) => return Err(ManifestError::Hash(e)),
        };

        report.checked += 1;
        if actual != expected {
            tracing::warn!(path = %record.file_path.display(), "content hash mismatch");
            report.mismatched.push(Mismatch {
                path: record.file_path.clone(),
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }
    }

    Ok(report)
}
