//! Extraction pipeline
//!
//! Sequences one run: enumerate the scan path, order the entries, select the
//! candidates, extract them one after another and remove whatever the run was
//! asked to remove. The first candidate that fails stops the batch.

use crate::core::cleanup::{remove_target, RemovableTarget};
use crate::core::error::Result;
use crate::core::extractor::{extract, ExtractOutcome};
use crate::core::scanner::{enumerate, list_overview, EntrySummary};
use crate::core::selection::{order_entries, select_candidates, SelectionMode};
use crate::volume::traits::Volume;
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Target arguments that request a recursive scan of the whole volume
pub const RECURSIVE_SENTINELS: &[&str] = &["all", "--all", "-all", "-a", "each"];

/// What part of the volume to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// Only the files directly in the root directory
    Root,
    /// The results folder of one instrument directory
    Subdirectory(String),
    /// Every file on the volume
    Everything,
}

impl ScanTarget {
    /// Interpret the optional target argument
    pub fn from_argument(argument: Option<&str>) -> Self {
        match argument {
            None => ScanTarget::Root,
            Some(arg) if RECURSIVE_SENTINELS.contains(&arg) => ScanTarget::Everything,
            Some(name) => ScanTarget::Subdirectory(name.to_string()),
        }
    }

    /// Volume path to scan and whether to descend into subdirectories
    pub fn resolve(&self, results_dir: &str) -> (String, bool) {
        match self {
            ScanTarget::Root => ("/".to_string(), false),
            ScanTarget::Subdirectory(name) => (format!("/{}/{}", name, results_dir), false),
            ScanTarget::Everything => ("/".to_string(), true),
        }
    }
}

/// Which candidates are compared by checksum before copying
///
/// The newest candidate is always compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// Only for the first candidate of the batch
    First,
    /// For every candidate
    #[default]
    Every,
}

impl VerifyPolicy {
    /// Whether the candidate at `index` in the batch is verified
    pub fn applies_to(&self, index: usize) -> bool {
        match self {
            VerifyPolicy::First => index == 0,
            VerifyPolicy::Every => true,
        }
    }
}

impl fmt::Display for VerifyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerifyPolicy::First => "first",
            VerifyPolicy::Every => "every",
        };
        f.write_str(name)
    }
}

impl FromStr for VerifyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(VerifyPolicy::First),
            "every" => Ok(VerifyPolicy::Every),
            other => Err(format!(
                "invalid verify policy '{}' (expected first or every)",
                other
            )),
        }
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Volume path to enumerate
    pub scan_path: String,
    /// Descend into subdirectories of the scan path
    pub recursive: bool,
    pub mode: SelectionMode,
    pub verify: VerifyPolicy,
    /// Root of the local output tree
    pub output_root: PathBuf,
    /// Delete each candidate from the volume once it was extracted or skipped
    pub remove_source: bool,
    /// Volume files deleted after a successful batch
    pub volume_paths: Vec<String>,
    /// Files under the output root deleted after a successful batch
    pub output_files: Vec<PathBuf>,
}

impl PipelineConfig {
    /// Config for scanning `target` with no cleanup
    pub fn new(target: &ScanTarget, results_dir: &str, output_root: impl Into<PathBuf>) -> Self {
        let (scan_path, recursive) = target.resolve(results_dir);
        Self {
            scan_path,
            recursive,
            mode: SelectionMode::default(),
            verify: VerifyPolicy::default(),
            output_root: output_root.into(),
            remove_source: false,
            volume_paths: Vec::new(),
            output_files: Vec::new(),
        }
    }

    /// Whether the run deletes anything from the volume
    pub fn writes_volume(&self) -> bool {
        self.remove_source || !self.volume_paths.is_empty()
    }
}

/// Outcome of one removal attempt
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub target: RemovableTarget,
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The candidate that stopped the batch
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFailure {
    pub source_path: String,
    pub error: String,
}

/// Record of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub volume: String,
    pub scan_path: String,
    pub recursive: bool,
    pub mode: SelectionMode,
    /// Top-level names of the volume, listed before a scoped scan
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub root_entries: Vec<String>,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    /// Number of files the scan found
    pub enumerated: usize,
    pub candidates: Vec<EntrySummary>,
    pub outcomes: Vec<ExtractOutcome>,
    pub removals: Vec<RemovalReport>,
    pub failed: Option<CandidateFailure>,
}

impl RunReport {
    fn new<V: Volume>(volume: &V, config: &PipelineConfig) -> Self {
        Self {
            volume: volume.label(),
            scan_path: config.scan_path.clone(),
            recursive: config.recursive,
            mode: config.mode,
            root_entries: Vec::new(),
            started_at: Local::now(),
            finished_at: None,
            enumerated: 0,
            candidates: Vec::new(),
            outcomes: Vec::new(),
            removals: Vec::new(),
            failed: None,
        }
    }

    /// Whether every candidate was extracted or skipped
    pub fn succeeded(&self) -> bool {
        self.failed.is_none()
    }

    pub fn extracted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_skipped()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn bytes_extracted(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                ExtractOutcome::Extracted { bytes, .. } => *bytes,
                ExtractOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    /// Removals that did not go through
    pub fn failed_removals(&self) -> impl Iterator<Item = &RemovalReport> {
        self.removals.iter().filter(|r| !r.removed)
    }

    fn record_removal(&mut self, volume: Option<&dyn Volume>, target: RemovableTarget) {
        let error = match remove_target(volume, &target) {
            Ok(()) => None,
            Err(e) => {
                warn!("{}", e);
                Some(e.to_string())
            }
        };
        self.removals.push(RemovalReport {
            removed: error.is_none(),
            target,
            error,
        });
    }
}

fn scan_spinner(path: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"));
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {}...", path));
    spinner
}

/// Run the whole pipeline against an open volume
///
/// Only an enumeration failure is returned as an error. A failing candidate
/// ends the batch and is recorded in the report's `failed` field.
pub fn run_pipeline<V: Volume>(volume: &V, config: &PipelineConfig) -> Result<RunReport> {
    let mut report = RunReport::new(volume, config);

    info!(
        "Scanning {} on {} ({})",
        config.scan_path,
        volume.label(),
        if config.recursive {
            "recursive"
        } else {
            "this directory only"
        }
    );

    // Show which instrument folders exist before narrowing to one
    if config.scan_path != "/" {
        match list_overview(volume, "/") {
            Ok(names) => report.root_entries = names,
            Err(e) => warn!("{}", e),
        }
    }

    let spinner = scan_spinner(&config.scan_path);
    let entries = match enumerate(volume, &config.scan_path, config.recursive) {
        Ok(entries) => entries,
        Err(e) => {
            spinner.abandon_with_message(format!("✗ Scan of {} failed", config.scan_path));
            error!("{}", e);
            return Err(e);
        }
    };
    spinner.finish_and_clear();
    report.enumerated = entries.len();

    let ordered = order_entries(entries);
    let candidates = select_candidates(&ordered, config.mode);
    report.candidates = candidates.iter().map(|c| EntrySummary::from(*c)).collect();

    if candidates.is_empty() {
        info!("No files found in {}", config.scan_path);
    } else {
        info!(
            "Selected {} of {} file(s) with {}",
            candidates.len(),
            ordered.len(),
            config.mode
        );
    }

    for (index, candidate) in candidates.iter().enumerate() {
        let verify = config.verify.applies_to(index);
        match extract(candidate, volume, &config.output_root, verify) {
            Ok(outcome) => {
                report.outcomes.push(outcome);
                if config.remove_source {
                    report.record_removal(
                        Some(volume),
                        RemovableTarget::Volume {
                            path: candidate.source_path(),
                        },
                    );
                }
            }
            Err(e) => {
                error!("{}", e);
                report.failed = Some(CandidateFailure {
                    source_path: candidate.source_path(),
                    error: e.to_string(),
                });
                break;
            }
        }
    }

    if report.succeeded() {
        for path in &config.volume_paths {
            report.record_removal(
                Some(volume),
                RemovableTarget::Volume { path: path.clone() },
            );
        }
        for file in &config.output_files {
            report.record_removal(
                None,
                RemovableTarget::Local {
                    path: config.output_root.join(file),
                },
            );
        }
    } else {
        warn!("Batch stopped early; skipping post-run cleanup");
    }

    report.finished_at = Some(Local::now());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ExtractionError;
    use crate::testdb::scenarios::{self, timestamp};
    use crate::testdb::{MockVolume, MockVolumeConfig};
    use std::fs;
    use tempfile::TempDir;

    fn smp50_config(out: &TempDir, mode: SelectionMode) -> PipelineConfig {
        let mut config = PipelineConfig::new(
            &ScanTarget::Subdirectory("SMP50".to_string()),
            "results",
            out.path(),
        );
        config.mode = mode;
        config
    }

    #[test]
    fn test_scan_target_from_argument() {
        assert_eq!(ScanTarget::from_argument(None), ScanTarget::Root);
        for sentinel in RECURSIVE_SENTINELS {
            assert_eq!(
                ScanTarget::from_argument(Some(sentinel)),
                ScanTarget::Everything
            );
        }
        assert_eq!(
            ScanTarget::from_argument(Some("SMP50")),
            ScanTarget::Subdirectory("SMP50".to_string())
        );
    }

    #[test]
    fn test_scan_target_resolve() {
        assert_eq!(ScanTarget::Root.resolve("results"), ("/".to_string(), false));
        assert_eq!(
            ScanTarget::Everything.resolve("results"),
            ("/".to_string(), true)
        );
        assert_eq!(
            ScanTarget::Subdirectory("SMP50".to_string()).resolve("results"),
            ("/SMP50/results".to_string(), false)
        );
        assert_eq!(
            ScanTarget::Subdirectory("UV200".to_string()).resolve("data"),
            ("/UV200/data".to_string(), false)
        );
    }

    #[test]
    fn test_verify_policy() {
        assert!(VerifyPolicy::First.applies_to(0));
        assert!(!VerifyPolicy::First.applies_to(1));
        assert!(VerifyPolicy::Every.applies_to(5));
        assert_eq!("first".parse::<VerifyPolicy>(), Ok(VerifyPolicy::First));
        assert!("sometimes".parse::<VerifyPolicy>().is_err());
        assert!("never".parse::<VerifyPolicy>().is_err());
        for policy in [VerifyPolicy::First, VerifyPolicy::Every] {
            assert!(policy.applies_to(0));
        }
        assert_eq!(VerifyPolicy::default(), VerifyPolicy::Every);
    }

    #[test]
    fn test_latest_extracts_newest_file() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results();

        let report = run_pipeline(&volume, &smp50_config(&out, SelectionMode::Latest)).unwrap();

        assert!(report.succeeded());
        assert_eq!(report.enumerated, 4);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.extracted_count(), 1);
        assert!(out.path().join("SMP50/results/run.log").exists());
        assert!(!out.path().join("SMP50/results/run.csv").exists());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_latest_same_extracts_sibling_files() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results();

        let report =
            run_pipeline(&volume, &smp50_config(&out, SelectionMode::LatestSameBasename)).unwrap();

        assert_eq!(report.extracted_count(), 2);
        assert!(out.path().join("SMP50/results/run.log").exists());
        assert!(out.path().join("SMP50/results/run.csv").exists());
        assert!(!out.path().join("SMP50/results/other.png").exists());
    }

    #[test]
    fn test_second_run_skips_everything() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results();
        let config = smp50_config(&out, SelectionMode::All);

        let first = run_pipeline(&volume, &config).unwrap();
        assert_eq!(first.extracted_count(), 4);

        let second = run_pipeline(&volume, &config).unwrap();
        assert_eq!(second.extracted_count(), 0);
        assert_eq!(second.skipped_count(), 4);
        assert_eq!(second.bytes_extracted(), 0);
    }

    #[test]
    fn test_remove_source_after_extract_and_skip() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results();
        let mut config = smp50_config(&out, SelectionMode::LatestSameBasename);

        // Pre-seed an identical copy of run.csv so it is skipped
        fs::create_dir_all(out.path().join("SMP50/results")).unwrap();
        fs::write(
            out.path().join("SMP50/results/run.csv"),
            volume.file_content("/SMP50/results/run.csv").unwrap(),
        )
        .unwrap();
        config.remove_source = true;

        let report = run_pipeline(&volume, &config).unwrap();

        assert_eq!(report.extracted_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(
            volume.stats().removed,
            vec!["/SMP50/results/run.log", "/SMP50/results/run.csv"]
        );
        assert!(volume.contains_file("/SMP50/results/other.png"));
    }

    #[test]
    fn test_removal_failure_is_not_fatal() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results().with_config(
            MockVolumeConfig::default().with_remove_error("/SMP50/results/run.log"),
        );
        let mut config = smp50_config(&out, SelectionMode::LatestSameBasename);
        config.remove_source = true;

        let report = run_pipeline(&volume, &config).unwrap();

        assert!(report.succeeded());
        assert_eq!(report.extracted_count(), 2);
        assert_eq!(report.failed_removals().count(), 1);
        assert_eq!(volume.stats().removed, vec!["/SMP50/results/run.csv"]);
    }

    #[test]
    fn test_candidate_failure_stops_batch() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results().with_config(
            MockVolumeConfig::default().with_open_error("/SMP50/results/run.csv"),
        );
        let mut config = smp50_config(&out, SelectionMode::All);
        config.remove_source = true;
        config.volume_paths = vec!["/SMP50/results/old.csv".to_string()];

        let report = run_pipeline(&volume, &config).unwrap();

        assert!(!report.succeeded());
        let failure = report.failed.as_ref().unwrap();
        assert_eq!(failure.source_path, "/SMP50/results/run.csv");
        // run.log went through before the failure; nothing after it was tried
        assert_eq!(report.outcomes.len(), 1);
        assert!(!out.path().join("SMP50/results/other.png").exists());
        // Post-run cleanup never ran
        assert!(volume.contains_file("/SMP50/results/old.csv"));
        assert_eq!(volume.stats().removed, vec!["/SMP50/results/run.log"]);
    }

    #[test]
    fn test_enumeration_failure_is_fatal() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::missing_results();

        let err = run_pipeline(&volume, &smp50_config(&out, SelectionMode::Latest)).unwrap_err();
        assert!(matches!(err, ExtractionError::EnumerationError { .. }));
    }

    #[test]
    fn test_empty_directory_succeeds_with_nothing_to_do() {
        let out = TempDir::new().unwrap();
        let mut volume = MockVolume::new("test");
        volume.add_dir("/SMP50/results");

        let report = run_pipeline(&volume, &smp50_config(&out, SelectionMode::Latest)).unwrap();

        assert!(report.succeeded());
        assert!(report.candidates.is_empty());
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_post_run_cleanup() {
        let out = TempDir::new().unwrap();
        let mut volume = MockVolume::new("test");
        volume.add_file("/SMP50/results", "run.csv", b"1", timestamp(10, 0));
        volume.add_file("/", "export.csv", b"stale", timestamp(9, 0));
        fs::write(out.path().join("summary.csv"), b"local").unwrap();

        let mut config = smp50_config(&out, SelectionMode::Latest);
        config.volume_paths = vec!["/export.csv".to_string()];
        config.output_files = vec![PathBuf::from("summary.csv"), PathBuf::from("absent.csv")];

        let report = run_pipeline(&volume, &config).unwrap();

        assert!(report.succeeded());
        assert!(!volume.contains_file("/export.csv"));
        assert!(!out.path().join("summary.csv").exists());
        assert_eq!(report.removals.len(), 3);
        let failed: Vec<_> = report.failed_removals().collect();
        assert_eq!(failed.len(), 1);
        assert!(matches!(failed[0].target, RemovableTarget::Local { .. }));
    }

    #[test]
    fn test_recursive_run_over_whole_volume() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::nested_tree();
        let mut config = PipelineConfig::new(&ScanTarget::Everything, "results", out.path());
        config.mode = SelectionMode::All;

        let report = run_pipeline(&volume, &config).unwrap();

        assert_eq!(report.enumerated, 4);
        assert_eq!(report.extracted_count(), 4);
        assert!(!out.path().join("LOST.DIR").exists());
        assert!(!out.path().join("System Volume Information").exists());
    }

    #[test]
    fn test_report_serializes() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results();
        let report = run_pipeline(&volume, &smp50_config(&out, SelectionMode::Latest)).unwrap();

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scan_path"], "/SMP50/results");
        assert_eq!(json["mode"], "latest");
        assert_eq!(json["outcomes"][0]["outcome"], "extracted");
        assert_eq!(json["candidates"][0]["path"], "/SMP50/results/run.log");
        assert!(json["failed"].is_null());
    }

    #[test]
    fn test_writes_volume() {
        let out = TempDir::new().unwrap();
        let mut config = smp50_config(&out, SelectionMode::Latest);
        assert!(!config.writes_volume());
        config.volume_paths.push("/x".to_string());
        assert!(config.writes_volume());
    }

    #[test]
    fn test_scoped_run_lists_volume_root() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results();

        let report = run_pipeline(&volume, &smp50_config(&out, SelectionMode::Latest)).unwrap();

        assert_eq!(report.root_entries, vec!["SMP50/"]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["root_entries"][0], "SMP50/");
    }

    #[test]
    fn test_root_listing_failure_does_not_stop_scoped_run() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::instrument_results()
            .with_config(MockVolumeConfig::default().with_list_error("/"));

        let report = run_pipeline(&volume, &smp50_config(&out, SelectionMode::Latest)).unwrap();

        assert!(report.succeeded());
        assert!(report.root_entries.is_empty());
        assert_eq!(report.extracted_count(), 1);
    }

    #[test]
    fn test_root_scan_does_not_list_root_twice() {
        let out = TempDir::new().unwrap();
        let volume = scenarios::nested_tree();
        let config = PipelineConfig::new(&ScanTarget::Root, "results", out.path());

        let report = run_pipeline(&volume, &config).unwrap();

        assert!(report.root_entries.is_empty());
        assert_eq!(volume.stats().listings, 1);
    }
}
