//! FAT image backend
//!
//! Reads an unpartitioned FAT12/16/32 image (the whole file is the filesystem,
//! as produced by `mkfs.vfat` on a USB-gadget backing file) through the
//! `fatfs` crate. The image is opened read-only unless the caller asks for
//! write access, which is only needed to delete files.

use crate::core::error::{ExtractionError, Result};
use crate::volume::traits::{path_components, Entry, ReadSeek, Volume};
use chrono::{NaiveDate, NaiveDateTime};
use fatfs::{Dir, FileSystem, FsOptions};
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A FAT filesystem image opened from a file on the host
pub struct FatVolume {
    image_path: PathBuf,
    fs: FileSystem<File>,
}

impl FatVolume {
    /// Open a FAT image
    ///
    /// # Arguments
    /// * `image_path` - Path to the image file on the host
    /// * `writable` - Open the image for writing (required for deletions)
    pub fn open<P: AsRef<Path>>(image_path: P, writable: bool) -> Result<Self> {
        let image_path = image_path.as_ref().to_path_buf();

        let image = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(&image_path)
            .map_err(|e| ExtractionError::VolumeError {
                path: image_path.clone(),
                message: e.to_string(),
            })?;

        let fs = FileSystem::new(image, FsOptions::new().update_accessed_date(false)).map_err(
            |e| ExtractionError::VolumeError {
                path: image_path.clone(),
                message: format!("not a FAT filesystem: {}", e),
            },
        )?;

        info!(
            "Opened {:?} volume '{}' from {} ({})",
            fs.fat_type(),
            fs.volume_label().trim(),
            image_path.display(),
            if writable { "read-write" } else { "read-only" }
        );

        Ok(Self { image_path, fs })
    }

    /// Path of the backing image file
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Flush pending metadata and close the image
    pub fn unmount(self) -> Result<()> {
        let image_path = self.image_path;
        self.fs.unmount().map_err(|e| ExtractionError::VolumeError {
            path: image_path,
            message: format!("failed to unmount: {}", e),
        })
    }

    fn dir_at(&self, path: &str) -> io::Result<Dir<'_, File>> {
        let components = path_components(path);
        let root = self.fs.root_dir();
        if components.is_empty() {
            Ok(root)
        } else {
            root.open_dir(&components.join("/"))
        }
    }

    fn file_path(path: &str) -> io::Result<String> {
        let components = path_components(path);
        if components.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' does not name a file", path),
            ));
        }
        Ok(components.join("/"))
    }
}

/// Convert a FAT timestamp to a calendar date-time
///
/// FAT stores local time without a zone. Out-of-range values found on
/// damaged volumes fall back to the epoch so they sort as oldest.
fn to_naive(stamp: fatfs::DateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(
        i32::from(stamp.date.year),
        u32::from(stamp.date.month),
        u32::from(stamp.date.day),
    )
    .and_then(|date| {
        date.and_hms_milli_opt(
            u32::from(stamp.time.hour),
            u32::from(stamp.time.min),
            u32::from(stamp.time.sec),
            u32::from(stamp.time.millis),
        )
    })
    .unwrap_or_default()
}

impl Volume for FatVolume {
    fn list_entries(&self, path: &str) -> io::Result<Vec<Entry>> {
        let dir = self.dir_at(path)?;
        let mut entries = Vec::new();

        for item in dir.iter() {
            let item = item?;
            entries.push(Entry {
                name: item.file_name(),
                is_dir: item.is_dir(),
                size: item.len(),
                modified: to_naive(item.modified()),
            });
        }

        debug!("Listed {} entries under '{}'", entries.len(), path);
        Ok(entries)
    }

    fn open_for_read(&self, path: &str) -> io::Result<Box<dyn ReadSeek + '_>> {
        let relative = Self::file_path(path)?;
        let file = self.fs.root_dir().open_file(&relative)?;
        Ok(Box::new(file))
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        let relative = Self::file_path(path)?;
        self.fs.root_dir().remove(&relative)
    }

    fn label(&self) -> String {
        format!("{}", self.image_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    const IMAGE_SIZE: u64 = 8 * 1024 * 1024;

    /// Format a blank image and fill it with a small results tree
    fn build_image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("piusb.bin");
        let mut image = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        image.set_len(IMAGE_SIZE).unwrap();
        fatfs::format_volume(&mut image, fatfs::FormatVolumeOptions::new()).unwrap();

        {
            let fs = FileSystem::new(&mut image, FsOptions::new()).unwrap();
            let root = fs.root_dir();
            let results = root.create_dir("SMP50").unwrap().create_dir("results").unwrap();
            results
                .create_file("run.csv")
                .unwrap()
                .write_all(b"t,value\n0,1\n")
                .unwrap();
            root.create_file("notes.txt")
                .unwrap()
                .write_all(b"hello")
                .unwrap();
        }

        path
    }

    #[test]
    fn test_open_rejects_non_fat_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let result = FatVolume::open(&path, false);
        assert!(matches!(result, Err(ExtractionError::VolumeError { .. })));
    }

    #[test]
    fn test_open_missing_image() {
        let dir = TempDir::new().unwrap();
        let result = FatVolume::open(dir.path().join("missing.bin"), false);
        assert!(matches!(result, Err(ExtractionError::VolumeError { .. })));
    }

    #[test]
    fn test_list_and_read_with_doubled_separators() {
        let dir = TempDir::new().unwrap();
        let path = build_image(&dir);
        let volume = FatVolume::open(&path, false).unwrap();

        let root: Vec<String> = volume
            .list_entries("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert!(root.contains(&"SMP50".to_string()));
        assert!(root.contains(&"notes.txt".to_string()));

        let results = volume.list_entries("//SMP50/results").unwrap();
        let run = results.iter().find(|e| e.name == "run.csv").unwrap();
        assert!(!run.is_dir);
        assert_eq!(run.size, 12);

        let mut content = String::new();
        volume
            .open_for_read("//SMP50/results/run.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "t,value\n0,1\n");
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = build_image(&dir);
        let volume = FatVolume::open(&path, false).unwrap();

        assert!(volume.list_entries("/NOPE/results").is_err());
        assert!(volume.open_for_read("/").is_err());
    }

    #[test]
    fn test_remove_on_writable_volume() {
        let dir = TempDir::new().unwrap();
        let path = build_image(&dir);

        let volume = FatVolume::open(&path, true).unwrap();
        volume.remove("//notes.txt").unwrap();
        volume.unmount().unwrap();

        let volume = FatVolume::open(&path, false).unwrap();
        let names: Vec<String> = volume
            .list_entries("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert!(!names.contains(&"notes.txt".to_string()));
        assert_eq!(volume.image_path(), path.as_path());
    }
}
