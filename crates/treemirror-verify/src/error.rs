use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("failed to read '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("invalid SHA-256 digest: {0}")]
    InvalidDigest(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
