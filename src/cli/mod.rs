//! CLI module for the image extraction tool
//!
//! # Submodules
//!
//! - `args` - Command-line argument definitions using clap
//! - `commands` - Command handler implementations
//! - `progress` - Console output helpers and the dual log writer

pub mod args;
pub mod commands;
pub mod progress;

pub use args::Args;
pub use commands::run_command;
pub use progress::DualWriter;
