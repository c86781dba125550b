use std::path::PathBuf;

use treemirror_verify::VerifyError;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to hash mirrored file: {0}")]
    Hash(#[source] VerifyError),

    #[error("failed to write manifest '{path}': {source}")]
    Write { path: PathBuf, source: csv::Error },

    #[error("failed to read manifest '{path}': {source}")]
    Read { path: PathBuf, source: csv::Error },

    #[error(transparent)]
    Output(#[from] treemirror_fs::Error),
}

pub type Result<T> = std::result::Result<T, ManifestError>;
