//! Test Database Module
//!
//! In-memory volumes that let every part of the extraction pipeline be
//! exercised without a FAT image on disk.
//!
//! # Submodules
//!
//! - `mock_volume` - `MockVolume`, an in-memory `Volume` with simulated
//!   failures and an operation log
//! - `scenarios` - Pre-built volumes shaped like real instrument images
//!
//! # Quick Start
//!
//! ```rust
//! use image_extraction_tool::testdb::scenarios;
//! use image_extraction_tool::volume::Volume;
//!
//! let volume = scenarios::instrument_results();
//! let entries = volume.list_entries("/SMP50/results").unwrap();
//! assert!(!entries.is_empty());
//! ```

pub mod mock_volume;
pub mod scenarios;

pub use mock_volume::{MockFileReader, MockObject, MockOperationStats, MockVolume, MockVolumeConfig};
