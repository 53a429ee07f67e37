//! engine::runner
//!
//! Catalog verification: run the patch verifier over a selection.
//!
//! # Architecture
//!
//! ```text
//! Resolve selection -> for each patch: discover variants -> verify -> record
//! ```
//!
//! The selection is resolved before the first trial, so a bad patch id
//! costs nothing. Progress is streamed through a [`Progress`] sink; the
//! finished [`CatalogReport`] is the only output.
//!
//! # Invariants
//!
//! - Patches are verified in selection order
//! - Exactly one result per selected patch
//! - The workspace is borrowed for the whole run and never shared

use thiserror::Error;
use tracing::info;

use super::verify::PatchVerifier;
use super::workspace::{Workspace, WorkspaceError};
use crate::catalog::{Catalog, CatalogError};
use crate::core::results::{CatalogReport, DiffVariant, PatchResult, TrialOutcome};
use crate::core::types::{PatchId, PatchSelection, VerifyMode};

/// Errors that abort a catalog run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The selection could not be resolved against the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The workspace became unusable mid-run.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Receives progress events during a run.
///
/// All methods default to doing nothing.
pub trait Progress {
    /// A patch is about to be verified.
    fn patch_started(&mut self, _patch: &PatchId, _variants: usize) {}

    /// One trial finished.
    fn trial_finished(&mut self, _variant: &DiffVariant, _outcome: TrialOutcome) {}

    /// A patch has its verdict.
    fn patch_finished(&mut self, _result: &PatchResult) {}
}

/// Progress sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Runs a verification over a catalog selection.
pub struct CatalogVerifier<'a> {
    verifier: PatchVerifier<'a>,
}

impl<'a> CatalogVerifier<'a> {
    pub fn new(verifier: PatchVerifier<'a>) -> Self {
        Self { verifier }
    }

    /// Verify every selected patch and aggregate the results.
    ///
    /// # Errors
    ///
    /// - [`RunError::Catalog`] if the catalog root is missing or the
    ///   selection names unknown patches; no trial has run
    /// - [`RunError::Workspace`] if the workspace could not be restored
    pub fn run(
        &self,
        selection: &PatchSelection,
        catalog: &Catalog,
        workspace: &mut Workspace,
        mode: VerifyMode,
        progress: &mut dyn Progress,
    ) -> Result<CatalogReport, RunError> {
        let entries = catalog.resolve(selection)?;
        info!(
            patches = entries.len(),
            mode = %mode,
            root = %catalog.root().display(),
            "starting catalog run"
        );

        let mut report = CatalogReport::new(mode);
        for entry in &entries {
            let variants = catalog.variants(entry);
            progress.patch_started(&entry.id, variants.len());

            let result = self
                .verifier
                .verify(&entry.id, &variants, workspace, mode, progress)?;
            progress.patch_finished(&result);
            report.push(result);
        }

        info!(
            total = report.total(),
            broken = report.broken(),
            "catalog run finished"
        );
        Ok(report)
    }
}
