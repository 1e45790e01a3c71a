//! Image Extraction Tool - CLI Entry Point
//!
//! Extracts result files from a FAT volume image into a local folder.
//!
//! This binary is a thin wrapper around the library, handling argument parsing,
//! configuration, logging setup, and command dispatch.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use image_extraction_tool::cli::{self, Args, DualWriter};
use image_extraction_tool::core::config::Config;
use log::{info, LevelFilter};
use std::fs::OpenOptions;
use std::io::Write;

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => Config::load_default().unwrap_or_else(|e| {
            eprintln!("Warning: {}; using default settings", e);
            Config::default()
        }),
    };

    // Apply CLI overrides to config
    if let Some(ref image) = args.image {
        config.volume.image = image.clone();
    }
    if let Some(ref output) = args.output {
        config.output.directory = output.clone();
    }
    if let Some(mode) = args.mode {
        config.extraction.mode = mode;
    }
    if let Some(verify) = args.verify {
        config.extraction.verify = verify;
    }
    if let Some(cleanup) = args.cleanup {
        config.cleanup.remove_source = cleanup;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    // Initialize logger
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    if config.logging.log_to_file {
        // Set up logging to both console and file
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logging.log_file)
            .with_context(|| {
                format!(
                    "Failed to open log file '{}'",
                    config.logging.log_file.display()
                )
            })?;

        Builder::new()
            .filter_level(log_level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {} {}] {}",
                    Local::now().format("%Y-%m-%dT%H:%M:%S%z"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .target(env_logger::Target::Pipe(Box::new(DualWriter {
                console: std::io::stderr(),
                file: log_file,
            })))
            .init();

        info!("Logging to file: {}", config.logging.log_file.display());
    } else {
        Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
            .init();
    }

    info!(
        "{} v{}",
        image_extraction_tool::NAME,
        image_extraction_tool::VERSION
    );
    info!("Started at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    cli::run_command(&args, &config)
}
