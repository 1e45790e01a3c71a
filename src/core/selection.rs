//! Ordering and selection of extraction candidates
//!
//! The enumerated files are put in a deterministic order (newest first) and
//! a selection mode picks which of them are copied out.

use crate::core::scanner::{LocatedEntry, SYSTEM_VOLUME_INFORMATION};
use log::info;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Name that always sorts after every other entry
pub const PINNED_LAST_NAME: &str = SYSTEM_VOLUME_INFORMATION;

/// Which of the ordered entries get extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Only the newest entry
    #[default]
    Latest,
    /// The newest entry and the entries directly after it that share its base name
    #[serde(rename = "latest_same")]
    LatestSameBasename,
    /// Every entry
    All,
}

impl SelectionMode {
    /// Command-line token for this mode
    pub fn as_arg(&self) -> &'static str {
        match self {
            SelectionMode::Latest => "--latest",
            SelectionMode::LatestSameBasename => "--latestSame",
            SelectionMode::All => "--all",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "--latest" => Ok(SelectionMode::Latest),
            "--latestSame" => Ok(SelectionMode::LatestSameBasename),
            "--all" => Ok(SelectionMode::All),
            other => Err(format!(
                "invalid mode '{}' (expected --latest, --latestSame or --all)",
                other
            )),
        }
    }
}

/// Name with its trailing extension removed
///
/// The extension starts at the last `.`, so `archive.tar.gz` has the base
/// name `archive.tar` and `.hidden` has an empty base name.
pub fn base_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

fn pinned_order(a: &LocatedEntry, b: &LocatedEntry) -> Ordering {
    let a_pinned = a.name() == PINNED_LAST_NAME;
    let b_pinned = b.name() == PINNED_LAST_NAME;
    a_pinned.cmp(&b_pinned)
}

/// Sort entries newest first, with the pinned name last
///
/// The sort is stable: entries with equal timestamps keep their
/// enumeration order.
pub fn order_entries(mut entries: Vec<LocatedEntry>) -> Vec<LocatedEntry> {
    entries.sort_by(|a, b| {
        pinned_order(a, b).then_with(|| b.entry.modified.cmp(&a.entry.modified))
    });

    info!("Sorted directory contents:");
    for located in &entries {
        info!(
            "  {}: {} - {}",
            located.containing_path, located.entry.name, located.entry.modified
        );
    }

    entries
}

/// Pick the candidates from an ordered list
pub fn select_candidates(ordered: &[LocatedEntry], mode: SelectionMode) -> Vec<&LocatedEntry> {
    let Some(head) = ordered.first() else {
        return Vec::new();
    };

    match mode {
        SelectionMode::Latest => vec![head],
        SelectionMode::LatestSameBasename => {
            let head_base = base_name(head.name());
            ordered
                .iter()
                .take_while(|e| base_name(e.name()) == head_base)
                .collect()
        }
        SelectionMode::All => ordered.iter().collect(),
    }
}
