use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{Result, Sha256Hasher, VerificationError, VerifiedReader};

/// Read size used when hashing files from disk.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Compute the lower-case hex SHA-256 of a file, streaming it in [`CHUNK_SIZE`] chunks.
pub fn checksum_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let read_err = |source: std::io::Error| VerificationError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let mut reader = VerifiedReader::new(file, Sha256Hasher::new());
    let mut buf = vec![0u8; CHUNK_SIZE];
    while reader.read(&mut buf).map_err(read_err)? > 0 {}

    Ok(hex::encode(reader.into_digest()))
}
