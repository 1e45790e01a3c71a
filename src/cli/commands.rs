//! Command handler implementations
//!
//! Turns parsed arguments and the loaded configuration into one pipeline run
//! against the FAT image, and prints the outcome.

use crate::cli::progress::{format_bytes, format_duration, print_banner, print_status, Mark};
use crate::cli::Args;
use crate::core::config::Config;
use crate::core::pipeline::{run_pipeline, PipelineConfig, RunReport, ScanTarget};
use crate::volume::FatVolume;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Run the appropriate command based on CLI arguments
///
/// `config` already carries the command-line overrides.
pub fn run_command(args: &Args, config: &Config) -> Result<()> {
    if let Some(ref path) = args.generate_config {
        return generate_config_file(path);
    }

    if args.show_config {
        return show_config(config);
    }

    extract(args, config)
}

/// Build the pipeline settings for this invocation
pub fn build_pipeline_config(args: &Args, config: &Config) -> PipelineConfig {
    let target = ScanTarget::from_argument(args.target.as_deref());
    let mut pipeline = PipelineConfig::new(
        &target,
        &config.scan.results_dir,
        config.output.directory.clone(),
    );
    pipeline.mode = config.extraction.mode;
    pipeline.verify = config.extraction.verify;
    pipeline.remove_source = config.cleanup.remove_source;
    pipeline.volume_paths = config.cleanup.volume_paths.clone();
    pipeline.output_files = config.cleanup.output_files.clone();
    pipeline
}

/// Extract from the configured image
fn extract(args: &Args, config: &Config) -> Result<()> {
    let start = Instant::now();
    let pipeline = build_pipeline_config(args, config);

    fs::create_dir_all(&pipeline.output_root).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            pipeline.output_root.display()
        )
    })?;
    debug!("Output directory: {}", pipeline.output_root.display());

    let volume = FatVolume::open(&config.volume.image, pipeline.writes_volume())?;
    let report = run_pipeline(&volume, &pipeline)?;

    if pipeline.writes_volume() {
        volume.unmount()?;
    }

    print_summary(&report, &pipeline.output_root);
    info!("Finished in {}", format_duration(start.elapsed()));

    if let Some(ref path) = args.report {
        write_report(&report, path)?;
    }

    if let Some(ref failure) = report.failed {
        bail!("Extraction of {} failed: {}", failure.source_path, failure.error);
    }

    Ok(())
}

/// Lines of the end-of-run summary
fn summary_lines(report: &RunReport, output_root: &Path) -> Vec<(Mark, String)> {
    let mut lines = vec![(Mark::Note, format!("Volume: {}", report.volume))];

    if !report.root_entries.is_empty() {
        lines.push((
            Mark::Note,
            format!("Volume root: {}", report.root_entries.join("  ")),
        ));
    }
    lines.push((
        Mark::Note,
        format!(
            "Scanned {}{}: {} file(s), {} selected with {}",
            report.scan_path,
            if report.recursive { " (recursive)" } else { "" },
            report.enumerated,
            report.candidates.len(),
            report.mode
        ),
    ));

    if report.extracted_count() > 0 {
        lines.push((
            Mark::Done,
            format!(
                "Extracted {} file(s), {} to {}",
                report.extracted_count(),
                format_bytes(report.bytes_extracted()),
                output_root.display()
            ),
        ));
    }
    if report.skipped_count() > 0 {
        lines.push((
            Mark::Note,
            format!("Skipped {} unchanged file(s)", report.skipped_count()),
        ));
    }

    let removed = report.removals.iter().filter(|r| r.removed).count();
    if removed > 0 {
        lines.push((Mark::Done, format!("Removed {} file(s)", removed)));
    }
    for removal in report.failed_removals() {
        lines.push((
            Mark::Warn,
            format!(
                "Could not remove {}: {}",
                removal.target,
                removal.error.as_deref().unwrap_or("unknown error")
            ),
        ));
    }

    if let Some(ref failure) = report.failed {
        lines.push((
            Mark::Fail,
            format!("Stopped at {}: {}", failure.source_path, failure.error),
        ));
    }
    lines
}

fn print_summary(report: &RunReport, output_root: &Path) {
    print_banner("Extraction Summary");
    for (mark, line) in summary_lines(report, output_root) {
        print_status(mark, &line);
    }
    println!();
}

/// Write the run report as pretty JSON
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write run report '{}'", path.display()))?;
    info!("Run report written to {}", path.display());
    Ok(())
}

/// Write the commented example configuration
pub fn generate_config_file(path: &Path) -> Result<()> {
    fs::write(path, Config::generate_default_config())
        .with_context(|| format!("Failed to write config file '{}'", path.display()))?;

    info!("Configuration file: {}", path.display());
    info!("Edit this file to customize the extraction settings.");
    Ok(())
}

/// Show the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    match Config::find_config_file() {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!(
            "(Using default settings - no config file found, would be read from {})",
            Config::get_active_config_path().display()
        ),
    }

    println!("{}", config.to_toml()?);
    Ok(())
}
