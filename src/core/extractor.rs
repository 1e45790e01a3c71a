//! Extraction of single candidates from the volume
//!
//! A candidate is copied to the output tree under the same relative path it
//! has on the volume. When asked to, the engine first compares checksums of
//! the source and an existing copy and leaves the copy alone if they match.

use crate::core::error::{ExtractionError, Result};
use crate::core::scanner::LocatedEntry;
use crate::digest::{compute_digest, Digest, DigestSource};
use crate::volume::traits::{path_components, Volume};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Result of extracting one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractOutcome {
    /// The file was copied
    Extracted {
        source_path: String,
        destination_path: PathBuf,
        bytes: u64,
    },
    /// An identical copy already existed; nothing was written
    Skipped {
        source_path: String,
        destination_path: PathBuf,
        digest: Digest,
    },
}

impl ExtractOutcome {
    pub fn source_path(&self) -> &str {
        match self {
            ExtractOutcome::Extracted { source_path, .. }
            | ExtractOutcome::Skipped { source_path, .. } => source_path,
        }
    }

    pub fn destination_path(&self) -> &Path {
        match self {
            ExtractOutcome::Extracted {
                destination_path, ..
            }
            | ExtractOutcome::Skipped {
                destination_path, ..
            } => destination_path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ExtractOutcome::Skipped { .. })
    }
}

/// Where a candidate lands in the output tree
///
/// Empty components of the containing path are dropped, so `//SMP50/results`
/// and `/SMP50/results` map to the same directory.
pub fn destination_path(output_root: &Path, candidate: &LocatedEntry) -> PathBuf {
    let mut destination = output_root.to_path_buf();
    for component in path_components(&candidate.containing_path) {
        destination.push(component);
    }
    destination.push(candidate.name());
    destination
}

/// Byte progress bar for one file copy
fn copy_progress(name: &str, len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {spinner:.green} {msg} [{bar:30.cyan/dim}] {bytes}/{total_bytes}")
    {
        bar.set_style(style.progress_chars("━━╾─"));
    }
    bar.set_message(name.to_string());
    bar
}

/// Remove a partially written destination after a failed copy
fn discard_partial(destination: &Path) {
    if let Err(e) = fs::remove_file(destination) {
        warn!(
            "Failed to remove partial output '{}': {}",
            destination.display(),
            e
        );
    }
}

/// Copy one candidate from the volume into the output tree
///
/// # Arguments
/// * `candidate` - The file to extract
/// * `volume` - Volume the candidate was enumerated from
/// * `output_root` - Root of the local output tree
/// * `verify_identical` - Compare checksums with an existing copy first
pub fn extract<V: Volume>(
    candidate: &LocatedEntry,
    volume: &V,
    output_root: &Path,
    verify_identical: bool,
) -> Result<ExtractOutcome> {
    let source_path = candidate.source_path();
    let destination = destination_path(output_root, candidate);

    let mut source =
        volume
            .open_for_read(&source_path)
            .map_err(|e| ExtractionError::OpenError {
                path: source_path.clone(),
                message: e.to_string(),
            })?;

    if verify_identical {
        let source_digest = compute_digest(DigestSource::Volume {
            path: &source_path,
            reader: &mut source,
        })?;

        if destination.exists() {
            let existing_digest = compute_digest(DigestSource::Local(&destination))?;
            debug!(
                "Checksums for {}: volume {} / local {}",
                candidate.name(),
                source_digest,
                existing_digest
            );

            if source_digest == existing_digest {
                info!(
                    "Skipping {}: identical copy at {}",
                    source_path,
                    destination.display()
                );
                return Ok(ExtractOutcome::Skipped {
                    source_path,
                    destination_path: destination,
                    digest: source_digest,
                });
            }
        }
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| ExtractionError::DirectoryCreateError {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let copy_error = |message: String| ExtractionError::CopyError {
        from: source_path.clone(),
        to: destination.clone(),
        message,
    };

    let file = File::create(&destination).map_err(|e| copy_error(format!("create: {}", e)))?;

    if let Err(e) = source.seek(SeekFrom::Start(0)) {
        drop(file);
        discard_partial(&destination);
        return Err(copy_error(format!("seek: {}", e)));
    }

    let bar = copy_progress(candidate.name(), candidate.entry.size);
    let mut writer = bar.wrap_write(file);
    let copied = io::copy(&mut source, &mut writer);
    drop(writer);

    let bytes = match copied {
        Ok(bytes) => {
            bar.finish_and_clear();
            bytes
        }
        Err(e) => {
            bar.abandon();
            discard_partial(&destination);
            return Err(copy_error(format!("copy: {}", e)));
        }
    };

    info!(
        "Extracted {} -> {} ({} bytes)",
        source_path,
        destination.display(),
        bytes
    );

    Ok(ExtractOutcome::Extracted {
        source_path,
        destination_path: destination,
        bytes,
    })
}
