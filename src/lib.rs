//! patchcheck - find community patches that no longer apply
//!
//! patchcheck takes a tool (dwm, st, surf, dmenu, ii) and the catalog of
//! community patches published for it, tries every diff of every selected
//! patch against a revision of the tool's source tree, and reports which
//! patches are broken.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Workspace preparation, apply trials, patch and catalog verification
//! - [`catalog`] - Discovery of patches and diff variants on disk
//! - [`report`] - Report files, summary line and JSON output
//! - [`core`] - Domain types, results, configuration and paths
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Terminal output
//!
//! # Correctness Invariants
//!
//! patchcheck maintains the following invariants:
//!
//! 1. The tool tree is pristine between any two trials
//! 2. A patch is working iff at least one of its diffs applies cleanly
//! 3. Report counts are derived from results, never tracked separately
//! 4. One run per checkout at a time

pub mod catalog;
pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod report;
pub mod ui;
