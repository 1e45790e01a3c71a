//! Error types for the image extraction tool
//!
//! Every variant carries the operation that failed and the path it failed on,
//! so a message can be logged as-is without extra context.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the image extraction tool
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The volume image could not be opened or is not a FAT filesystem
    #[error("Failed to open volume image '{path}': {message}")]
    VolumeError { path: PathBuf, message: String },

    /// A directory on the volume could not be listed
    #[error("Failed to list directory '{path}' on the volume: {message}")]
    EnumerationError { path: String, message: String },

    /// A candidate could not be opened for reading on the volume
    #[error("Failed to open '{path}' on the volume: {message}")]
    OpenError { path: String, message: String },

    /// A checksum could not be computed because the stream could not be consumed
    #[error("Failed to compute checksum of '{path}': {message}")]
    DigestError { path: String, message: String },

    /// The output directory for a candidate could not be created
    #[error("Failed to create directory '{}': {message}", path.display())]
    DirectoryCreateError { path: PathBuf, message: String },

    /// Creating, rewinding or writing the destination failed
    #[error("Failed to copy '{from}' to '{}': {message}", to.display())]
    CopyError {
        from: String,
        to: PathBuf,
        message: String,
    },

    /// A volume entry or local output file could not be removed
    #[error("Failed to remove {target}: {message}")]
    RemoveError { target: String, message: String },

    /// General I/O error
    #[error("IO error: {0}")]
    IoError(String),
}

impl ExtractionError {
    /// Whether this error aborts the whole invocation rather than one candidate
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExtractionError::VolumeError { .. } | ExtractionError::EnumerationError { .. }
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ExtractionError>;

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::IoError(err.to_string())
    }
}
