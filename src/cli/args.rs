//! Command-line argument definitions
//!
//! The three positional arguments keep the historic call form
//! `image-extractor [TARGET] [MODE] [CLEANUP]`, so their values may start with
//! hyphens (`--all`, `-a`, `--latestSame`). Named options therefore avoid the
//! short flags `-a` and `-l`.

use crate::core::pipeline::VerifyPolicy;
use crate::core::selection::SelectionMode;
use clap::Parser;
use std::path::PathBuf;

/// Extract result files from a FAT volume image into a local folder
#[derive(Parser, Debug)]
#[command(name = "image-extractor")]
#[command(author = "Vihaan Reddy M")]
#[command(version)]
#[command(
    about = "Extract the latest result files from a FAT volume image",
    long_about = None
)]
pub struct Args {
    /// Instrument folder to read <TARGET>/results from; all, --all, -all, -a or each
    /// scans the whole volume; omitted scans the root directory only
    #[arg(value_name = "TARGET", allow_hyphen_values = true)]
    pub target: Option<String>,

    /// --latest (newest file), --latestSame (newest file and its same-named
    /// siblings) or --all (every file)
    #[arg(value_name = "MODE", allow_hyphen_values = true, value_parser = parse_selection_mode)]
    pub mode: Option<SelectionMode>,

    /// Delete extracted files from the volume (1, t, true, 0, f, false, ...)
    #[arg(value_name = "CLEANUP", value_parser = parse_bool_flag)]
    pub cleanup: Option<bool>,

    /// FAT image to read (overrides config)
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Output directory for extracted files (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Which files to compare by checksum before copying: first, every (overrides config)
    #[arg(long, value_name = "POLICY", value_parser = parse_verify_policy)]
    pub verify: Option<VerifyPolicy>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Show the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write a commented example configuration file and exit
    #[arg(long, value_name = "FILE")]
    pub generate_config: Option<PathBuf>,
}

/// Parse the MODE argument
pub fn parse_selection_mode(value: &str) -> Result<SelectionMode, String> {
    value.parse()
}

/// Parse a --verify value
pub fn parse_verify_policy(value: &str) -> Result<VerifyPolicy, String> {
    value.parse()
}

/// Parse the CLEANUP argument
///
/// Accepted spellings:
/// `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool_flag(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("invalid boolean '{}'", other)),
    }
}
