//! engine::trial
//!
//! Apply trials: try one diff variant against the workspace and classify
//! the outcome.
//!
//! # Architecture
//!
//! A trial is three steps, always in this order:
//!
//! ```text
//! Stage -> Apply (strategy) -> Restore
//! ```
//!
//! The [`ApplyStrategy`] decides Clean or Failed. Before staging, the trial
//! records which ignored files already exist. Restoration (hard reset, clean,
//! remove ignored files that were not there before, remove the staged file)
//! runs after every apply, including applies that errored.
//!
//! # Invariants
//!
//! - The workspace tree is identical before and after every trial
//! - Staging and launch failures become a Failed outcome, never a run error
//! - A failed restoration is a run error: the tree can no longer be trusted
//!
//! # Known limitation
//!
//! [`StderrApply`] infers success from an empty error channel. A diff that
//! applies with warnings counts as Failed; a diff that applies but changes
//! the wrong files counts as Clean.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::workspace::{Workspace, WorkspaceError};
use crate::core::paths;
use crate::core::results::{DiffVariant, TrialOutcome};
use crate::core::types::StrategyKind;
use crate::git::{cli, ApplyCheck, Git, GitError, VcsProvider};

/// Errors inside a single trial. These never escape [`ApplyTrial::attempt`].
#[derive(Debug, Error)]
pub enum TrialError {
    /// The diff could not be staged into the workspace.
    #[error("failed to stage {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The apply mechanism could not be run.
    #[error("apply mechanism unavailable: {0}")]
    Environment(#[source] GitError),
}

/// Decides whether a staged diff applies to a workspace.
pub trait ApplyStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply (or check) the diff at `staged` against the tree at `workspace`.
    fn apply(&self, staged: &Path, workspace: &Path) -> Result<TrialOutcome, TrialError>;
}

/// Runs `git apply` and treats any output on its error channel as failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrApply;

impl ApplyStrategy for StderrApply {
    fn name(&self) -> &'static str {
        "stderr"
    }

    fn apply(&self, staged: &Path, workspace: &Path) -> Result<TrialOutcome, TrialError> {
        let output = cli::apply(workspace, staged).map_err(TrialError::Environment)?;
        if output.has_error_output() {
            debug!(
                "git apply reported: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(TrialOutcome::Failed)
        } else {
            Ok(TrialOutcome::Clean)
        }
    }
}

/// Check-only apply through libgit2. Never modifies the working tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckApply;

impl ApplyStrategy for CheckApply {
    fn name(&self) -> &'static str {
        "check"
    }

    fn apply(&self, staged: &Path, workspace: &Path) -> Result<TrialOutcome, TrialError> {
        let diff = fs::read(staged).map_err(|e| TrialError::Io {
            path: staged.to_path_buf(),
            source: e,
        })?;
        let git = Git::open(workspace).map_err(TrialError::Environment)?;

        match git.check_apply(&diff).map_err(TrialError::Environment)? {
            ApplyCheck::Applies => Ok(TrialOutcome::Clean),
            ApplyCheck::Rejected(reason) => {
                debug!("check apply rejected: {reason}");
                Ok(TrialOutcome::Failed)
            }
        }
    }
}

/// Build the strategy for a configured kind.
pub fn strategy_for(kind: StrategyKind) -> Box<dyn ApplyStrategy> {
    match kind {
        StrategyKind::Stderr => Box::new(StderrApply),
        StrategyKind::Check => Box::new(CheckApply),
    }
}

/// Runs apply trials against a workspace.
pub struct ApplyTrial<'a> {
    vcs: &'a dyn VcsProvider,
    strategy: &'a dyn ApplyStrategy,
}

impl<'a> ApplyTrial<'a> {
    pub fn new(vcs: &'a dyn VcsProvider, strategy: &'a dyn ApplyStrategy) -> Self {
        Self { vcs, strategy }
    }

    /// Try one diff variant and restore the workspace.
    ///
    /// # Errors
    ///
    /// Only [`WorkspaceError::Restore`]: the ignored files could not be
    /// listed, or the workspace could not be brought back to a clean state,
    /// so no further trial can be trusted. Problems with the variant itself
    /// are reported as [`TrialOutcome::Failed`].
    pub fn attempt(
        &self,
        variant: &DiffVariant,
        workspace: &mut Workspace,
    ) -> Result<TrialOutcome, WorkspaceError> {
        let ignored_before = self
            .vcs
            .ignored_paths(workspace.path())
            .map_err(|e| WorkspaceError::Restore {
                path: workspace.path().to_path_buf(),
                source: e,
            })?;

        let outcome = match self.stage_and_apply(variant, workspace) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(variant = %variant.path().display(), "trial error, counting as failed: {e}");
                TrialOutcome::Failed
            }
        };

        self.restore(workspace, &ignored_before)?;

        debug!(
            strategy = self.strategy.name(),
            variant = %variant.file_name(),
            ?outcome,
            "trial finished"
        );
        Ok(outcome)
    }

    fn stage_and_apply(
        &self,
        variant: &DiffVariant,
        workspace: &Workspace,
    ) -> Result<TrialOutcome, TrialError> {
        let staged = paths::staged_diff_path(workspace.path());
        fs::copy(variant.path(), &staged).map_err(|e| TrialError::Io {
            path: variant.path().to_path_buf(),
            source: e,
        })?;
        self.strategy.apply(&staged, workspace.path())
    }

    fn restore(
        &self,
        workspace: &Workspace,
        ignored_before: &BTreeSet<PathBuf>,
    ) -> Result<(), WorkspaceError> {
        let path = workspace.path();
        self.vcs
            .hard_reset(path)
            .and_then(|()| self.vcs.clean(path))
            .and_then(|()| self.vcs.remove_ignored(path, ignored_before))
            .map_err(|e| WorkspaceError::Restore {
                path: path.to_path_buf(),
                source: e,
            })?;

        // An ignored staged file left by an interrupted run is in the snapshot.
        let staged = paths::staged_diff_path(path);
        match fs::remove_file(&staged) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WorkspaceError::Restore {
                path: path.to_path_buf(),
                source: GitError::Io {
                    path: staged,
                    source: e,
                },
            }),
        }
    }
}
