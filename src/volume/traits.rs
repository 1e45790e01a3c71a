//! Volume abstraction traits for testability
//!
//! The extraction pipeline only needs four things from a filesystem image:
//! list a directory, open a file for reading, delete a file, and a readable
//! name for log output. Both the FAT image backend and the in-memory mock
//! volume implement [`Volume`], so the whole pipeline can be exercised
//! without an image on disk.
//!
//! Paths handed to a volume are `/`-separated strings built by plain
//! concatenation (`containing_path + "/" + name`). They may therefore contain
//! doubled separators such as `//results`; implementations must treat empty
//! components as no-ops instead of relying on a host path join.

use chrono::NaiveDateTime;
use std::fmt;
use std::io::{self, Read, Seek};

/// A readable, rewindable byte stream for one file on a volume
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// One object listed in a volume directory
///
/// This is a read-only snapshot; the pipeline never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name of the object, without any path separators
    pub name: String,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time as recorded on the volume
    pub modified: NaiveDateTime,
}

impl Entry {
    /// Create a file entry
    pub fn file(name: &str, size: u64, modified: NaiveDateTime) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
            size,
            modified,
        }
    }

    /// Create a directory entry
    pub fn dir(name: &str, modified: NaiveDateTime) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
            size: 0,
            modified,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir {
            write!(f, "{}/ - {}", self.name, self.modified)
        } else {
            write!(f, "{} - {} bytes - {}", self.name, self.size, self.modified)
        }
    }
}

/// Access to a mounted filesystem image
///
/// All operations take `&self`; implementations that need to mutate internal
/// state use interior mutability. A volume is only ever driven from one
/// thread, so no `Send`/`Sync` bound is required.
pub trait Volume {
    /// List the objects directly under `path` in the volume's own order
    fn list_entries(&self, path: &str) -> io::Result<Vec<Entry>>;

    /// Open the file at `path` for reading
    fn open_for_read(&self, path: &str) -> io::Result<Box<dyn ReadSeek + '_>>;

    /// Delete the file at `path`
    fn remove(&self, path: &str) -> io::Result<()>;

    /// Human-readable name of the volume for log output
    fn label(&self) -> String;
}

/// Split a volume path into its non-empty components
///
/// `"//SMP50/results/"` yields `["SMP50", "results"]`.
pub fn path_components(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

/// Normalize a volume path to a single leading `/` and no empty components
pub fn normalize_path(path: &str) -> String {
    let components = path_components(path);
    if components.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", components.join("/"))
    }
}
