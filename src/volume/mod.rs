//! Volume access module
//!
//! This module provides access to the filesystem image that files are
//! extracted from.
//!
//! # Submodules
//!
//! - `traits` - The `Volume` abstraction and the `Entry` snapshot type
//! - `fat` - FAT image backend built on the `fatfs` crate
//!
//! The pipeline is generic over `Volume`, so the in-memory mock volume in
//! `testdb` can stand in for a real image.

pub mod fat;
pub mod traits;

pub use fat::FatVolume;
pub use traits::{normalize_path, path_components, Entry, ReadSeek, Volume};
