//! Directory enumeration on the volume
//!
//! Produces the flat list of files the selection policy works on. Navigation
//! entries and the filesystem's own bookkeeping folders are dropped at every
//! depth; directories are only ever descended into, never returned.

use crate::core::error::{ExtractionError, Result};
use crate::volume::traits::{Entry, Volume};
use log::{debug, info};
use serde::Serialize;

/// Folder Windows creates on every FAT volume it mounts
pub const SYSTEM_VOLUME_INFORMATION: &str = "System Volume Information";

/// Folder Android creates for recovered cluster fragments
pub const LOST_FRAGMENTS_DIR: &str = "LOST.DIR";

/// Names never surfaced by the enumerator
const SKIPPED_NAMES: &[&str] = &[".", "..", SYSTEM_VOLUME_INFORMATION, LOST_FRAGMENTS_DIR];

/// A listed file together with the directory it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEntry {
    pub entry: Entry,
    /// Volume path of the containing directory, without the entry's name
    pub containing_path: String,
}

impl LocatedEntry {
    pub fn new(entry: Entry, containing_path: &str) -> Self {
        Self {
            entry,
            containing_path: containing_path.to_string(),
        }
    }

    /// Full volume path of the entry
    ///
    /// Plain concatenation with a literal `/`. A generic path join would
    /// normalize the root and separators in ways the volume's addressing
    /// does not promise to accept.
    pub fn source_path(&self) -> String {
        format!("{}/{}", self.containing_path, self.entry.name)
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

/// Serializable view of a located entry for run reports
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub path: String,
    pub size: u64,
    pub modified: String,
}

impl From<&LocatedEntry> for EntrySummary {
    fn from(located: &LocatedEntry) -> Self {
        Self {
            path: located.source_path(),
            size: located.entry.size,
            modified: located.entry.modified.to_string(),
        }
    }
}

/// Whether the enumerator hides entries with this name
pub fn is_skipped_name(name: &str) -> bool {
    SKIPPED_NAMES.contains(&name)
}

/// List the files under `path`, descending into subdirectories when `recursive`
///
/// The result is in the volume's listing order. A directory that cannot be
/// listed fails the whole call; no partial list is returned.
pub fn enumerate<V: Volume>(volume: &V, path: &str, recursive: bool) -> Result<Vec<LocatedEntry>> {
    info!("{} directory contents (only files are used further):", path);

    let entries = volume
        .list_entries(path)
        .map_err(|e| ExtractionError::EnumerationError {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    let mut files = Vec::new();

    for entry in entries {
        if is_skipped_name(&entry.name) {
            debug!("Skipping reserved entry '{}' in {}", entry.name, path);
            continue;
        }

        if entry.is_dir {
            if recursive {
                let subdir = format!("{}/{}", path, entry.name);
                debug!("Descending into {}", subdir);
                files.extend(enumerate(volume, &subdir, true)?);
            }
        } else {
            files.push(LocatedEntry::new(entry, path));
        }
    }

    for file in &files {
        info!(
            "  {} - {} bytes in path {}",
            file.entry.name, file.entry.size, file.containing_path
        );
    }

    Ok(files)
}

/// Names directly under `path`, with a trailing `/` on directories
///
/// Only for display; reserved entries are left out as in [`enumerate`].
pub fn list_overview<V: Volume>(volume: &V, path: &str) -> Result<Vec<String>> {
    let entries = volume
        .list_entries(path)
        .map_err(|e| ExtractionError::EnumerationError {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    info!("{} directory contents:", path);
    let mut names = Vec::new();
    for entry in entries.iter().filter(|e| !is_skipped_name(&e.name)) {
        info!("  {}", entry);
        if entry.is_dir {
            names.push(format!("{}/", entry.name));
        } else {
            names.push(entry.name.clone());
        }
    }
    Ok(names)
}
