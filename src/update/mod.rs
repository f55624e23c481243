//! Catalog update pipeline.
//!
//! An update runs backup → download → load → diff → reindex. Each phase
//! either hands its output to the next or ends the run with an
//! [`UpdateFailure`]; there is no retry and no rollback.

mod backup;
mod orchestrator;

pub use backup::create_backup;
pub use orchestrator::{parse_and_index, UpdateOrchestrator};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::diff::UpdateCounters;
use crate::reports::SummaryReporter;

/// Switches of one update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Download the feed even when an archive is present
    pub force_download: bool,
    /// Back up the current catalog and write diff reports
    pub create_diff: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            force_download: false,
            create_diff: true,
        }
    }
}

/// Phases of an update run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePhase {
    Backup,
    Download,
    Load,
    Diff,
    Reindex,
}

impl UpdatePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Download => "download",
            Self::Load => "load",
            Self::Diff => "diff",
            Self::Reindex => "reindex",
        }
    }
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an update run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFailure {
    pub phase: UpdatePhase,
    pub cause: String,
}

impl UpdateFailure {
    pub fn new(phase: UpdatePhase, cause: impl Into<String>) -> Self {
        Self {
            phase,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for UpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (during {} phase)", self.cause, self.phase)
    }
}

/// Result of an update run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Run timestamp (`YYYYmmdd_HHMMSS`) shared by every file of the run
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<UpdateFailure>,
    pub total_indexed: usize,
    pub backup_file: Option<PathBuf>,
    pub diff_file: Option<PathBuf>,
    pub csv_diff_file: Option<PathBuf>,
    /// Present when a diff was computed
    pub statistics: Option<UpdateCounters>,
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Plain-text summary of the run.
    pub fn summary(&self) -> String {
        SummaryReporter::new().no_color().update_summary(self)
    }
}
