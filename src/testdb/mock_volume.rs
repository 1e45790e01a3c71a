//! Mock volume implementation for testing without a disk image
//!
//! This module provides an in-memory implementation of the `Volume` trait
//! with a configurable directory tree, simulated failures, and a record of
//! every operation performed on it.

use crate::volume::traits::{normalize_path, path_components, Entry, ReadSeek, Volume};
use chrono::NaiveDateTime;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;

/// Represents a file or directory in the mock volume
#[derive(Debug, Clone)]
pub struct MockObject {
    /// Listing snapshot returned by `list_entries`
    pub entry: Entry,
    /// File content (None for directories and pseudo-entries)
    pub content: Option<Vec<u8>>,
}

/// Configuration for simulated failures
///
/// Paths are compared after normalization, so `//a/b` and `/a/b` match.
#[derive(Debug, Clone, Default)]
pub struct MockVolumeConfig {
    /// Directories whose listing fails
    pub list_error_paths: Vec<String>,
    /// Files that fail to open
    pub open_error_paths: Vec<String>,
    /// Files that open but fail on the first read
    pub read_error_paths: Vec<String>,
    /// Files whose removal fails
    pub remove_error_paths: Vec<String>,
}

impl MockVolumeConfig {
    /// Make listing of `path` fail
    pub fn with_list_error(mut self, path: &str) -> Self {
        self.list_error_paths.push(normalize_path(path));
        self
    }

    /// Make opening `path` fail
    pub fn with_open_error(mut self, path: &str) -> Self {
        self.open_error_paths.push(normalize_path(path));
        self
    }

    /// Make reading `path` fail after a successful open
    pub fn with_read_error(mut self, path: &str) -> Self {
        self.read_error_paths.push(normalize_path(path));
        self
    }

    /// Make removing `path` fail
    pub fn with_remove_error(mut self, path: &str) -> Self {
        self.remove_error_paths.push(normalize_path(path));
        self
    }
}

/// Statistics about operations performed on the mock volume
#[derive(Debug, Clone, Default)]
pub struct MockOperationStats {
    /// Directory listings served
    pub listings: usize,
    /// Files opened for reading
    pub opens: usize,
    /// Total bytes handed out by readers
    pub bytes_read: u64,
    /// Seek calls on readers
    pub seeks: usize,
    /// Paths passed to `remove`, exactly as given
    pub removed: Vec<String>,
}

/// In-memory volume
pub struct MockVolume {
    label: String,
    /// Normalized directory path -> children in listing order
    directories: RefCell<HashMap<String, Vec<MockObject>>>,
    config: MockVolumeConfig,
    stats: Rc<RefCell<MockOperationStats>>,
}

impl MockVolume {
    /// Create an empty volume containing only the root directory
    pub fn new(label: &str) -> Self {
        let mut directories = HashMap::new();
        directories.insert("/".to_string(), Vec::new());
        Self {
            label: label.to_string(),
            directories: RefCell::new(directories),
            config: MockVolumeConfig::default(),
            stats: Rc::new(RefCell::new(MockOperationStats::default())),
        }
    }

    /// Replace the failure simulation config
    pub fn with_config(mut self, config: MockVolumeConfig) -> Self {
        self.config = config;
        self
    }

    /// Create a directory and any missing ancestors
    ///
    /// Directories created this way carry the default (epoch) timestamp.
    pub fn add_dir(&mut self, path: &str) {
        let components = path_components(path);
        let directories = self.directories.get_mut();
        let mut parent = "/".to_string();

        for name in components {
            let child = if parent == "/" {
                format!("/{}", name)
            } else {
                format!("{}/{}", parent, name)
            };

            if !directories.contains_key(&child) {
                directories.insert(child.clone(), Vec::new());
                directories
                    .entry(parent.clone())
                    .or_default()
                    .push(MockObject {
                        entry: Entry::dir(name, NaiveDateTime::default()),
                        content: None,
                    });
            }
            parent = child;
        }
    }

    /// Add a file to `dir`, creating the directory if needed
    pub fn add_file(&mut self, dir: &str, name: &str, content: &[u8], modified: NaiveDateTime) {
        self.add_dir(dir);
        let key = normalize_path(dir);
        self.directories
            .get_mut()
            .entry(key)
            .or_default()
            .push(MockObject {
                entry: Entry::file(name, content.len() as u64, modified),
                content: Some(content.to_vec()),
            });
    }

    /// Append a raw listing entry (e.g. `.` or `..`) to `dir`
    ///
    /// No directory is created for it, so it cannot be descended into.
    pub fn add_raw_entry(&mut self, dir: &str, entry: Entry) {
        self.add_dir(dir);
        self.directories
            .get_mut()
            .entry(normalize_path(dir))
            .or_default()
            .push(MockObject {
                entry,
                content: None,
            });
    }

    /// Current content of the file at `path`, if it exists
    pub fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        let (parent, name) = split_parent(path)?;
        self.directories
            .borrow()
            .get(&parent)?
            .iter()
            .find(|o| o.entry.name == name && !o.entry.is_dir)
            .and_then(|o| o.content.clone())
    }

    /// Whether a file exists at `path`
    pub fn contains_file(&self, path: &str) -> bool {
        self.file_content(path).is_some()
    }

    /// Snapshot of the operation statistics
    pub fn stats(&self) -> MockOperationStats {
        self.stats.borrow().clone()
    }

    /// Clear the operation statistics
    pub fn reset_stats(&self) {
        *self.stats.borrow_mut() = MockOperationStats::default();
    }

    /// Number of files across all directories
    pub fn file_count(&self) -> usize {
        self.directories
            .borrow()
            .values()
            .flatten()
            .filter(|o| o.content.is_some())
            .count()
    }
}

/// Split a volume path into (normalized parent, name)
fn split_parent(path: &str) -> Option<(String, String)> {
    let mut components = path_components(path);
    let name = components.pop()?.to_string();
    let parent = if components.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", components.join("/"))
    };
    Some((parent, name))
}

fn simulated(kind: io::ErrorKind, what: &str, path: &str) -> io::Error {
    io::Error::new(kind, format!("simulated {} error for '{}'", what, path))
}

impl Volume for MockVolume {
    fn list_entries(&self, path: &str) -> io::Result<Vec<Entry>> {
        let key = normalize_path(path);
        if self.config.list_error_paths.contains(&key) {
            return Err(simulated(io::ErrorKind::Other, "listing", path));
        }

        let directories = self.directories.borrow();
        let children = directories.get(&key).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {}", path),
            )
        })?;

        self.stats.borrow_mut().listings += 1;
        Ok(children.iter().map(|o| o.entry.clone()).collect())
    }

    fn open_for_read(&self, path: &str) -> io::Result<Box<dyn ReadSeek + '_>> {
        let key = normalize_path(path);
        if self.config.open_error_paths.contains(&key) {
            return Err(simulated(io::ErrorKind::PermissionDenied, "open", path));
        }

        let content = self.file_content(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file not found: {}", path))
        })?;

        self.stats.borrow_mut().opens += 1;
        Ok(Box::new(MockFileReader {
            cursor: Cursor::new(content),
            stats: Rc::clone(&self.stats),
            fail_reads: self.config.read_error_paths.contains(&key),
        }))
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        if self
            .config
            .remove_error_paths
            .contains(&normalize_path(path))
        {
            return Err(simulated(io::ErrorKind::PermissionDenied, "remove", path));
        }

        let (parent, name) = split_parent(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "cannot remove the root")
        })?;

        let mut directories = self.directories.borrow_mut();
        let children = directories.get_mut(&parent).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("not found: {}", path))
        })?;
        let position = children
            .iter()
            .position(|o| o.entry.name == name && o.content.is_some())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("file not found: {}", path))
            })?;
        children.remove(position);

        self.stats.borrow_mut().removed.push(path.to_string());
        Ok(())
    }

    fn label(&self) -> String {
        format!("mock volume '{}'", self.label)
    }
}

/// A reader over mock file content that records its activity
pub struct MockFileReader {
    cursor: Cursor<Vec<u8>>,
    stats: Rc<RefCell<MockOperationStats>>,
    fail_reads: bool,
}

impl Read for MockFileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_reads {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "simulated read error",
            ));
        }
        let n = self.cursor.read(buf)?;
        self.stats.borrow_mut().bytes_read += n as u64;
        Ok(n)
    }
}

impl Seek for MockFileReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.stats.borrow_mut().seeks += 1;
        self.cursor.seek(pos)
    }
}
