//! Image Extraction Tool Library
//!
//! Extracts result files from a FAT volume image, such as the backing file of
//! a USB mass-storage gadget that a measuring instrument writes to, without
//! mounting the image.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`volume`] - Access to the image: the `Volume` trait and the FAT backend
//! - [`digest`] - SHA256 checksums for skipping unchanged files
//! - [`core`] - Configuration, errors, and the extraction pipeline
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testdb`] - In-memory volumes and scenarios for testing
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use image_extraction_tool::core::pipeline::{run_pipeline, PipelineConfig, ScanTarget};
//! use image_extraction_tool::core::selection::SelectionMode;
//! use image_extraction_tool::volume::FatVolume;
//!
//! fn main() -> anyhow::Result<()> {
//!     let volume = FatVolume::open("./piusb.bin", false)?;
//!
//!     let target = ScanTarget::from_argument(Some("SMP50"));
//!     let mut config = PipelineConfig::new(&target, "results", "./target/");
//!     config.mode = SelectionMode::LatestSameBasename;
//!
//!     let report = run_pipeline(&volume, &config)?;
//!     println!("{} file(s) extracted", report.extracted_count());
//!     Ok(())
//! }
//! ```
//!
//! # Testing Without an Image
//!
//! ```rust
//! use image_extraction_tool::core::pipeline::{run_pipeline, PipelineConfig, ScanTarget};
//! use image_extraction_tool::testdb::scenarios;
//!
//! let volume = scenarios::instrument_results();
//! let output = tempfile::tempdir().unwrap();
//! let target = ScanTarget::Subdirectory("SMP50".to_string());
//! let config = PipelineConfig::new(&target, "results", output.path());
//!
//! let report = run_pipeline(&volume, &config).unwrap();
//! assert!(report.succeeded());
//! ```

pub mod cli;
pub mod core;
pub mod digest;
pub mod testdb;
pub mod volume;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
