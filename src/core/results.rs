//! core::results
//!
//! Verification results: what a trial produced, what a patch amounts to,
//! and what a whole catalog run adds up to.
//!
//! # Invariants
//!
//! - A [`PatchResult`] is Working iff one of its trial records is Clean.
//!   The status is derived at construction and cannot be set by hand.
//! - A [`CatalogReport`] derives its counts from its results, so
//!   `working + broken == total` always holds and `total` counts patches,
//!   never diff variants.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::types::{PatchId, VerifyMode};

/// One diff file offered as a variant of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffVariant {
    patch: PatchId,
    path: PathBuf,
}

impl DiffVariant {
    pub fn new(patch: PatchId, path: impl Into<PathBuf>) -> Self {
        Self {
            patch,
            path: path.into(),
        }
    }

    /// The patch this variant belongs to.
    pub fn patch(&self) -> &PatchId {
        &self.patch
    }

    /// Full path of the diff file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the diff, as shown in reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Outcome of one apply trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialOutcome {
    Clean,
    Failed,
}

impl TrialOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, TrialOutcome::Clean)
    }
}

/// A diff variant paired with the outcome of its trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialRecord {
    pub variant: DiffVariant,
    pub outcome: TrialOutcome,
}

/// Overall verdict for a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStatus {
    Working,
    Broken,
}

/// Verification result for one patch.
///
/// # Example
///
/// ```
/// use patchcheck::core::results::{DiffVariant, PatchResult, PatchStatus, TrialOutcome, TrialRecord};
/// use patchcheck::core::types::PatchId;
///
/// let id = PatchId::new("alpha").unwrap();
/// let record = TrialRecord {
///     variant: DiffVariant::new(id.clone(), "alpha/dwm-alpha-6.2.diff"),
///     outcome: TrialOutcome::Failed,
/// };
///
/// let result = PatchResult::from_trials(id.clone(), vec![record]);
/// assert_eq!(result.status(), PatchStatus::Broken);
///
/// let empty = PatchResult::from_trials(id, Vec::new());
/// assert_eq!(empty.status(), PatchStatus::Broken);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchResult {
    patch: PatchId,
    status: PatchStatus,
    trials: Vec<TrialRecord>,
}

impl PatchResult {
    /// Build a result from the trials that were run, in the order they ran.
    pub fn from_trials(patch: PatchId, trials: Vec<TrialRecord>) -> Self {
        let status = if trials.iter().any(|t| t.outcome.is_clean()) {
            PatchStatus::Working
        } else {
            PatchStatus::Broken
        };
        Self {
            patch,
            status,
            trials,
        }
    }

    pub fn patch(&self) -> &PatchId {
        &self.patch
    }

    pub fn status(&self) -> PatchStatus {
        self.status
    }

    pub fn is_working(&self) -> bool {
        self.status == PatchStatus::Working
    }

    /// Trials in the order they ran. In fast mode this stops at the first
    /// Clean record.
    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }
}

/// Aggregate result of a catalog run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    mode: VerifyMode,
    results: Vec<PatchResult>,
}

impl CatalogReport {
    pub fn new(mode: VerifyMode) -> Self {
        Self {
            mode,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: PatchResult) {
        self.results.push(result);
    }

    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Results in evaluation order.
    pub fn results(&self) -> &[PatchResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn working(&self) -> usize {
        self.results.iter().filter(|r| r.is_working()).count()
    }

    pub fn broken(&self) -> usize {
        self.total() - self.working()
    }

    /// Ids of broken patches, sorted.
    pub fn broken_patches(&self) -> Vec<&PatchId> {
        let mut broken: Vec<&PatchId> = self
            .results
            .iter()
            .filter(|r| !r.is_working())
            .map(PatchResult::patch)
            .collect();
        broken.sort();
        broken
    }
}
