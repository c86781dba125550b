//! Content hashing primitives for mirrored files.
//!
//! Hashes are computed incrementally so a file of any size is read in
//! bounded memory.
//!
//! # Example
//!
//! ```
//! use treemirror_verify::{HashingReader, Sha256Hasher};
//!
//! let data = b"hello world";
//! let expected = Sha256Hasher::digest(data);
//!
//! let mut reader = HashingReader::new(&data[..], Sha256Hasher::new());
//! std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
//!
//! reader.verify(&expected).unwrap();
//! ```

pub use self::error::{Result, VerifyError};
pub use self::hasher::{Digest, Hasher, Sha256Hasher};
pub use self::reader::HashingReader;

mod error;
mod hasher;
mod reader;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// SHA-256 of the full content of the file at `path`.
pub fn digest_file(path: impl AsRef<Path>) -> Result<Digest> {
    let path = path.as_ref();
    let io_err = |source| VerifyError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut reader = HashingReader::new(BufReader::new(file), Sha256Hasher::new());
    io::copy(&mut reader, &mut io::sink()).map_err(io_err)?;
    Ok(reader.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_digest_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("greeting");
        std::fs::write(&path, "hello world").unwrap();

        assert_eq!(
            digest_file(&path).unwrap().to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_digest_file_larger_than_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big");
        let content: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        assert_eq!(digest_file(&path).unwrap(), Sha256Hasher::digest(&content));
    }

    #[test]
    fn test_digest_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        match digest_file(&missing) {
            Err(VerifyError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
