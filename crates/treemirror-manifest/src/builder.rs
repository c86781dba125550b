use std::path::{Path, PathBuf};

use treemirror_fs::AtomicWriter;
use walkdir::WalkDir;

use crate::error::{ManifestError, Result};
use crate::record::{HEADER, ManifestRecord};

/// File name of the manifest written next to the mirror root by default.
pub const DEFAULT_MANIFEST_NAME: &str = "repository_sha256";

/// Hashes every regular file below a root and writes the manifest.
///
/// Symlinks and other non-regular entries are not followed or listed. A file
/// that cannot be read fails the whole build; nothing is written in that case.
#[derive(Clone, Debug)]
pub struct ManifestBuilder {
    root: PathBuf,
}

impl ManifestBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    /// Walks the root and hashes each file, in walk order.
    ///
    /// `exclude` is skipped if the walk reaches it, however either path is
    /// spelled, which keeps a manifest stored inside the root out of its own
    /// listing.
    pub fn records(&self, exclude: Option<&Path>) -> Result<Vec<ManifestRecord>> {
        let mut records = Vec::new();
        let excluded = exclude
            .and_then(canonical_target)
            .zip(self.root.canonicalize().ok());

        for entry in WalkDir::new(&self.root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| ManifestError::Walk {
                path: e.path().unwrap_or(&self.root).to_path_buf(),
                source: e,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some((target, root)) = &excluded {
                let same = entry
                    .path()
                    .strip_prefix(&self.root)
                    .is_ok_and(|rel| root.join(rel) == *target);
                if same {
                    continue;
                }
            }

            let digest = treemirror_verify::digest_file(entry.path()).map_err(ManifestError::Hash)?;
            tracing::debug!(path = %entry.path().display(), hash = %digest, "hashed file");
            records.push(ManifestRecord {
                file_path: entry.into_path(),
                content_hash: digest.to_hex(),
            });
        }

        Ok(records)
    }

    /// Rebuilds the manifest at `manifest_path` from scratch.
    ///
    /// The previous manifest, if any, is replaced atomically once every file
    /// has been hashed and every row written.
    pub fn build(&self, manifest_path: impl AsRef<Path>) -> Result<Vec<ManifestRecord>> {
        let manifest_path = manifest_path.as_ref();
        let records = self.records(Some(manifest_path))?;

        let write_err = |source| ManifestError::Write {
            path: manifest_path.to_path_buf(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(AtomicWriter::create(manifest_path)?);

        writer.write_record(HEADER).map_err(write_err)?;
        for record in &records {
            writer.serialize(record).map_err(write_err)?;
        }

        let output = writer
            .into_inner()
            .map_err(|e| write_err(csv::Error::from(e.into_error())))?;
        output.commit()?;

        tracing::info!(
            root = %self.root.display(),
            manifest = %manifest_path.display(),
            files = records.len(),
            "wrote manifest"
        );
        Ok(records)
    }
}

/// Canonical form of a file path whose parent exists; the file itself may not.
fn canonical_target(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(parent.canonicalize().ok()?.join(name))
}
