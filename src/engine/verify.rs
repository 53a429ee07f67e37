//! engine::verify
//!
//! Patch verification: decide a patch's status from its diff variants.
//!
//! # Modes
//!
//! - [`VerifyMode::Fast`] stops at the first variant that applies cleanly
//! - [`VerifyMode::Exhaustive`] tries every variant and records each outcome
//!
//! Both modes agree on the status: a patch is working iff at least one
//! variant applies cleanly. A patch with no variants is broken.
//!
//! # Invariants
//!
//! - Variants are tried in the order given
//! - Every trial recorded in the result actually ran

use tracing::debug;

use super::runner::Progress;
use super::trial::ApplyTrial;
use super::workspace::{Workspace, WorkspaceError};
use crate::core::results::{DiffVariant, PatchResult, TrialRecord};
use crate::core::types::{PatchId, VerifyMode};

/// Decides patch status by running trials.
pub struct PatchVerifier<'a> {
    trial: ApplyTrial<'a>,
}

impl<'a> PatchVerifier<'a> {
    pub fn new(trial: ApplyTrial<'a>) -> Self {
        Self { trial }
    }

    /// Verify one patch.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError`] if the workspace could not be restored after a
    /// trial. The run cannot continue past that point.
    pub fn verify(
        &self,
        patch: &PatchId,
        variants: &[DiffVariant],
        workspace: &mut Workspace,
        mode: VerifyMode,
        progress: &mut dyn Progress,
    ) -> Result<PatchResult, WorkspaceError> {
        let mut trials = Vec::with_capacity(variants.len());

        for variant in variants {
            let outcome = self.trial.attempt(variant, workspace)?;
            progress.trial_finished(variant, outcome);
            trials.push(TrialRecord {
                variant: variant.clone(),
                outcome,
            });

            if outcome.is_clean() && !mode.is_exhaustive() {
                break;
            }
        }

        let result = PatchResult::from_trials(patch.clone(), trials);
        debug!(
            patch = %patch,
            status = ?result.status(),
            trials = result.trials().len(),
            "patch verified"
        );
        Ok(result)
    }
}
