//! Self-heal by wiping the consensus state and exiting.
//!
//! # Responsibilities
//! - Resolve the consensus data directory under the node home
//! - Delete it depth-first, children before parents
//! - Terminate the process with [`RECOVERY_EXIT_CODE`]
//!
//! # Design Decisions
//! - Deletion is best-effort: a failed entry is logged and skipped
//! - Symlinks are removed, never followed
//! - Exit goes through [`ProcessExit`] so tests can observe it

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::NodeConfig;
use crate::observability::metrics;

/// Exit status telling the supervisor the node wiped its consensus state.
pub const RECOVERY_EXIT_CODE: i32 = 100;

/// Terminates the process.
pub trait ProcessExit: Send + Sync {
    /// In production this never returns.
    fn exit(&self, code: i32);
}

/// [`ProcessExit`] backed by `std::process::exit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl ProcessExit for ProcessTerminator {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}

/// The consensus persisted-state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryTarget {
    path: PathBuf,
}

impl RecoveryTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(node: &NodeConfig) -> Self {
        Self::new(node.consensus_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute form of the path, for logging.
    pub fn absolute(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }
}

/// Counts from one purge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSummary {
    pub removed: usize,
    pub failed: usize,
}

/// Recursively delete `root` and everything below it.
///
/// A missing `root` is not an error.
pub fn purge_dir(root: &Path) -> PurgeSummary {
    let mut summary = PurgeSummary::default();
    match fs::symlink_metadata(root) {
        Ok(_) => remove_entry(root, &mut summary),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %root.display(), "Consensus directory does not exist");
        }
        Err(e) => {
            summary.failed += 1;
            tracing::warn!(path = %root.display(), error = %e, "Cannot stat consensus directory");
        }
    }
    summary
}

fn remove_entry(path: &Path, summary: &mut PurgeSummary) {
    let is_dir = fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    let result = if is_dir {
        match fs::read_dir(path) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(entry) => remove_entry(&entry.path(), summary),
                        Err(e) => {
                            summary.failed += 1;
                            tracing::warn!(
                                path = %path.display(),
                                error = %e,
                                "Failed to read directory entry"
                            );
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to list directory");
            }
        }
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => summary.removed += 1,
        Err(e) => {
            summary.failed += 1;
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete");
        }
    }
}

/// Wipes the [`RecoveryTarget`] and terminates the process.
pub struct RecoveryAction {
    target: RecoveryTarget,
    exit: Arc<dyn ProcessExit>,
}

impl RecoveryAction {
    pub fn new(target: RecoveryTarget, exit: Arc<dyn ProcessExit>) -> Self {
        Self { target, exit }
    }

    /// Purge and exit. Returns only if the [`ProcessExit`] hook does.
    pub async fn execute(&self) -> PurgeSummary {
        let path = self.target.absolute();
        tracing::warn!(path = %path.display(), "Deleting consensus module directory");

        let purge_path = path.clone();
        let summary = match tokio::task::spawn_blocking(move || purge_dir(&purge_path)).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Consensus directory purge task failed");
                PurgeSummary { removed: 0, failed: 1 }
            }
        };

        tracing::warn!(
            path = %path.display(),
            removed = summary.removed,
            failed = summary.failed,
            exit_code = RECOVERY_EXIT_CODE,
            "System exit"
        );
        metrics::record_recovery();

        self.exit.exit(RECOVERY_EXIT_CODE);
        summary
    }
}
