//! Removal of volume entries and local output files

use crate::core::error::{ExtractionError, Result};
use crate::volume::traits::Volume;
use log::info;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Something that can be deleted after a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemovableTarget {
    /// A file on the volume, addressed by its volume path
    Volume { path: String },
    /// A file in the host filesystem
    Local { path: PathBuf },
}

impl fmt::Display for RemovableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovableTarget::Volume { path } => write!(f, "volume file '{}'", path),
            RemovableTarget::Local { path } => write!(f, "local file '{}'", path.display()),
        }
    }
}

/// Delete a target
///
/// Volume targets are passed to the volume exactly as given. A volume target
/// with no volume attached fails instead of being silently ignored.
pub fn remove_target(volume: Option<&dyn Volume>, target: &RemovableTarget) -> Result<()> {
    let removal_error = |message: String| ExtractionError::RemoveError {
        target: target.to_string(),
        message,
    };

    match target {
        RemovableTarget::Volume { path } => {
            let volume = volume.ok_or_else(|| removal_error("no volume attached".to_string()))?;
            volume
                .remove(path)
                .map_err(|e| removal_error(format!("{} ({})", e, volume.label())))?;
        }
        RemovableTarget::Local { path } => {
            fs::remove_file(path).map_err(|e| removal_error(e.to_string()))?;
        }
    }

    info!("Removed {}", target);
    Ok(())
}
