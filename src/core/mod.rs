//! Core functionality module
//!
//! The extraction pipeline and everything it is configured with.
//!
//! # Submodules
//!
//! - `cleanup` - Removal of volume entries and local files
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `extractor` - Copying one candidate into the output tree
//! - `pipeline` - One run: scan, order, select, extract, clean up
//! - `scanner` - Directory enumeration on the volume
//! - `selection` - Ordering and selection policies

pub mod cleanup;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod scanner;
pub mod selection;
