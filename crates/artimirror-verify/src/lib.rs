//! Content verification primitives for mirrored artifacts.
//!
//! Hashing is incremental: [`VerifiedReader`] digests bytes as they stream through and
//! [`checksum_file`] never holds more than one chunk of a file in memory.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use artimirror_verify::{Sha256Hasher, VerifiedReader};
//!
//! let data = b"hello world";
//!
//! let mut reader = VerifiedReader::new(&data[..], Sha256Hasher::new());
//! let mut buffer = Vec::new();
//! reader.read_to_end(&mut buffer).unwrap();
//!
//! assert_eq!(buffer, data);
//! assert_eq!(reader.into_digest(), Sha256Hasher::digest(data));
//! ```

pub use self::error::{Result, VerificationError};
pub use self::file::{checksum_file, CHUNK_SIZE};
pub use self::hasher::{hex_eq, Hasher, Sha256Hasher};
pub use self::reader::VerifiedReader;

mod error;
mod file;
mod hasher;
mod reader;
