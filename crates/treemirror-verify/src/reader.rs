use std::io::{self, Read};

use crate::{Digest, Hasher, Result, VerifyError};

/// Reader that hashes bytes as they pass through.
pub struct HashingReader<R, H> {
    reader: R,
    hasher: H,
    bytes_read: u64,
}

impl<R, H> HashingReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 { self.bytes_read }
}

impl<R, H: Hasher> HashingReader<R, H> {
    pub fn finish(self) -> Digest { self.hasher.finalize() }

    /// Finalizes and compares against `expected`.
    pub fn verify(self, expected: &Digest) -> Result<()> {
        let actual = self.finish();
        if &actual == expected {
            Ok(())
        } else {
            Err(VerifyError::Mismatch {
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            })
        }
    }
}

impl<R: Read, H: Hasher> Read for HashingReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }
}
