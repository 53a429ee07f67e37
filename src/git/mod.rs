//! git
//!
//! Single interface for all version-control operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2` or spawns the `git` binary.
//!
//! - [`interface`] - local repository operations through git2
//! - [`cli`] - clone, pull and apply through the `git` binary
//! - [`provider`] - the [`VcsProvider`] seam and its real implementation
//! - [`mock`] - an in-memory provider for tests
//!
//! # Invariants
//!
//! - Every operation takes the checkout path explicitly
//! - Child processes get an explicit working directory
//! - The process's current directory is never changed

pub mod cli;
mod interface;
pub mod mock;
pub mod provider;

pub use interface::{ApplyCheck, Git, GitError, WorktreeStatus};
pub use provider::{GitProvider, VcsProvider};
