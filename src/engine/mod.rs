//! engine
//!
//! Runs verification: prepare the workspace, try diffs, aggregate results.
//!
//! # Architecture
//!
//! The engine is layered bottom-up; each layer only calls the one below:
//!
//! 1. **Trial** ([`trial`]): apply one diff variant, classify, restore
//! 2. **Verify** ([`verify`]): decide one patch from its variants
//! 3. **Runner** ([`runner`]): verify a selection of the catalog
//!
//! [`workspace`] sits beside them and produces the locked [`Workspace`]
//! every layer borrows.
//!
//! # Lifecycle
//!
//! ```text
//! Prepare workspace -> Resolve selection -> (Trial -> Restore)* -> Report
//! ```
//!
//! # Invariants
//!
//! - Trials are strictly sequential; the workspace is borrowed mutably
//! - The tree is pristine between any two trials
//! - Broken patches never fail a run; only workspace and catalog errors do
//!
//! # Example
//!
//! ```ignore
//! use patchcheck::engine::{ApplyTrial, CatalogVerifier, NoProgress, PatchVerifier, StderrApply};
//!
//! let trial = ApplyTrial::new(&vcs, &StderrApply);
//! let runner = CatalogVerifier::new(PatchVerifier::new(trial));
//! let report = runner.run(&selection, &catalog, &mut workspace, mode, &mut NoProgress)?;
//! println!("{}/{} broken patches", report.broken(), report.total());
//! ```

pub mod runner;
pub mod trial;
pub mod verify;
pub mod workspace;

pub use runner::{CatalogVerifier, NoProgress, Progress, RunError};
pub use trial::{strategy_for, ApplyStrategy, ApplyTrial, CheckApply, StderrApply, TrialError};
pub use verify::PatchVerifier;
pub use workspace::{
    PreparedWorkspace, Workspace, WorkspaceError, WorkspaceProvider, WorkspaceRequest,
};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (no progress output).
    pub quiet: bool,
}
