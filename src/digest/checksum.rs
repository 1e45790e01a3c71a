//! Content checksums
//!
//! SHA256 over a byte stream, streamed in fixed-size chunks so large files
//! never have to fit in memory. A source is either an open volume stream or
//! a file in the local output tree.
//!
//! # Example
//!
//! ```rust
//! use image_extraction_tool::digest::{compute_digest, DigestSource};
//! use std::io::Cursor;
//!
//! let mut stream = Cursor::new(b"Hello, World!".to_vec());
//! let digest = compute_digest(DigestSource::Volume {
//!     path: "/hello.txt",
//!     reader: &mut stream,
//! })
//! .unwrap();
//! assert_eq!(
//!     digest.as_str(),
//!     "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
//! );
//! ```

use crate::core::error::{ExtractionError, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Buffer size for streaming hash computation (64KB)
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// SHA256 hash represented as a fixed-size array
pub type Sha256Hash = [u8; 32];

/// Where the bytes to digest come from
pub enum DigestSource<'a> {
    /// An open stream on the volume; read from its current position to EOF.
    /// The caller rewinds it afterwards if it needs the bytes again.
    Volume {
        path: &'a str,
        reader: &'a mut dyn Read,
    },
    /// A file in the host filesystem
    Local(&'a Path),
}

impl DigestSource<'_> {
    fn describe(&self) -> String {
        match self {
            DigestSource::Volume { path, .. } => path.to_string(),
            DigestSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Lowercase hex SHA256 of a file's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wrap a raw hash
    pub fn from_hash(hash: &Sha256Hash) -> Self {
        Digest(hash_to_hex(hash))
    }

    /// Hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the digest of a volume stream or local file
pub fn compute_digest(source: DigestSource<'_>) -> Result<Digest> {
    let described = source.describe();
    let digest_error = |e: io::Error| ExtractionError::DigestError {
        path: described.clone(),
        message: e.to_string(),
    };

    let hash = match source {
        DigestSource::Volume { reader, .. } => compute_reader_hash(reader).map_err(digest_error)?,
        DigestSource::Local(path) => {
            let file = File::open(path).map_err(digest_error)?;
            let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
            compute_reader_hash(&mut reader).map_err(digest_error)?
        }
    };

    let digest = Digest::from_hash(&hash);
    trace!("SHA256 of {}: {}", described, digest);
    Ok(digest)
}

/// Compute SHA256 of everything left in a reader
pub fn compute_reader_hash(reader: &mut dyn Read) -> io::Result<Sha256Hash> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Ok(hash)
}

/// Compute SHA256 of in-memory data
pub fn compute_data_hash(data: &[u8]) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Convert a hash to a hexadecimal string
pub fn hash_to_hex(hash: &Sha256Hash) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Seek, SeekFrom};
    use tempfile::TempDir;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sector unreadable"))
        }
    }

    #[test]
    fn test_compute_data_hash() {
        let hash = compute_data_hash(b"Hello, World!");

        // Known SHA256 hash of "Hello, World!"
        let expected = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";
        assert_eq!(hash_to_hex(&hash), expected);
    }

    #[test]
    fn test_volume_and_local_sources_agree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("copy.csv");
        std::fs::write(&path, b"t,value\n0,1\n").unwrap();

        let mut stream = Cursor::new(b"t,value\n0,1\n".to_vec());
        let from_volume = compute_digest(DigestSource::Volume {
            path: "/copy.csv",
            reader: &mut stream,
        })
        .unwrap();
        let from_disk = compute_digest(DigestSource::Local(&path)).unwrap();

        assert_eq!(from_volume, from_disk);
        assert_eq!(from_volume.as_str().len(), 64);
    }

    #[test]
    fn test_reads_from_current_position() {
        let mut stream = Cursor::new(b"headerBODY".to_vec());
        stream.seek(SeekFrom::Start(6)).unwrap();

        let rest = compute_digest(DigestSource::Volume {
            path: "/f",
            reader: &mut stream,
        })
        .unwrap();
        assert_eq!(rest, Digest::from_hash(&compute_data_hash(b"BODY")));

        // The stream is left at EOF; rewinding is the caller's job
        assert_eq!(stream.position(), 10);
    }

    #[test]
    fn test_larger_than_buffer() {
        let data: Vec<u8> = (0..(HASH_BUFFER_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let mut stream = Cursor::new(data.clone());
        let hash = compute_reader_hash(&mut stream).unwrap();
        assert_eq!(hash, compute_data_hash(&data));
    }

    #[test]
    fn test_read_failure_is_digest_error() {
        let mut reader = FailingReader;
        let err = compute_digest(DigestSource::Volume {
            path: "/bad.bin",
            reader: &mut reader,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractionError::DigestError { ref path, .. } if path == "/bad.bin"));
    }

    #[test]
    fn test_missing_local_file_is_digest_error() {
        let dir = TempDir::new().unwrap();
        let err = compute_digest(DigestSource::Local(&dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, ExtractionError::DigestError { .. }));
    }

    #[test]
    fn test_digest_display_and_serde() {
        let digest = Digest::from_hash(&compute_data_hash(b"test"));
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest));
    }
}
