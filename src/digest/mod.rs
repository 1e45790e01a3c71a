//! Content digest module
//!
//! Decides whether a file on the volume and a previously extracted copy are
//! identical by comparing SHA256 checksums.
//!
//! # Submodules
//!
//! - `checksum` - Streaming SHA256 over volume streams and local files

pub mod checksum;

pub use checksum::{
    compute_data_hash, compute_digest, compute_reader_hash, hash_to_hex, Digest, DigestSource,
    Sha256Hash,
};
