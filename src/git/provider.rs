//! git::provider
//!
//! The version-control provider seam.
//!
//! # Design
//!
//! Workspace management and apply trials only ever talk to version control
//! through [`VcsProvider`]. Every method takes the checkout path explicitly.
//! [`GitProvider`] is the real implementation; [`super::mock::MockVcs`]
//! records calls in memory for tests that should not need real repositories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{cli, Git, GitError};

/// Narrow interface over the version-control operations a run needs.
pub trait VcsProvider {
    /// Clone `url` into `dest`, which must not exist yet.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Bring `branch` of the checkout at `path` up to date with its remote.
    fn pull(&self, path: &Path, branch: &str) -> Result<(), GitError>;

    /// Check out `revision`, discarding local changes.
    fn checkout(&self, path: &Path, revision: &str) -> Result<(), GitError>;

    /// Reset index and working tree to HEAD.
    fn hard_reset(&self, path: &Path) -> Result<(), GitError>;

    /// Remove untracked, non-ignored files.
    fn clean(&self, path: &Path) -> Result<(), GitError>;

    /// Ignored files currently in the checkout, relative to `path`.
    fn ignored_paths(&self, path: &Path) -> Result<BTreeSet<PathBuf>, GitError>;

    /// Remove ignored files that are not listed in `keep`.
    fn remove_ignored(&self, path: &Path, keep: &BTreeSet<PathBuf>) -> Result<(), GitError>;

    /// Abbreviated hash of HEAD.
    fn identify_revision(&self, path: &Path) -> Result<String, GitError>;

    /// Tag pointing exactly at HEAD, if any.
    fn describe_tag(&self, path: &Path) -> Result<Option<String>, GitError>;
}

/// Remote every checkout is refreshed from.
pub const DEFAULT_REMOTE: &str = "origin";

/// [`VcsProvider`] backed by git2 for local operations and the `git` binary
/// for network operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitProvider;

impl GitProvider {
    pub fn new() -> Self {
        Self
    }
}

impl VcsProvider for GitProvider {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        debug!(url, dest = %dest.display(), "cloning");
        cli::clone(url, dest)
    }

    fn pull(&self, path: &Path, branch: &str) -> Result<(), GitError> {
        // Pull into the branch itself, not into whatever revision a previous
        // run left checked out.
        Git::open(path)?.checkout(branch)?;
        cli::pull(path, DEFAULT_REMOTE, branch)
    }

    fn checkout(&self, path: &Path, revision: &str) -> Result<(), GitError> {
        Git::open(path)?.checkout(revision)
    }

    fn hard_reset(&self, path: &Path) -> Result<(), GitError> {
        Git::open(path)?.reset_hard()
    }

    fn clean(&self, path: &Path) -> Result<(), GitError> {
        let removed = Git::open(path)?.clean_untracked()?;
        if removed > 0 {
            debug!(path = %path.display(), removed, "removed untracked files");
        }
        Ok(())
    }

    fn ignored_paths(&self, path: &Path) -> Result<BTreeSet<PathBuf>, GitError> {
        Git::open(path)?.ignored_paths()
    }

    fn remove_ignored(&self, path: &Path, keep: &BTreeSet<PathBuf>) -> Result<(), GitError> {
        let removed = Git::open(path)?.remove_ignored_except(keep)?;
        if removed > 0 {
            debug!(path = %path.display(), removed, "removed ignored files");
        }
        Ok(())
    }

    fn identify_revision(&self, path: &Path) -> Result<String, GitError> {
        Git::open(path)?.short_head()
    }

    fn describe_tag(&self, path: &Path) -> Result<Option<String>, GitError> {
        Git::open(path)?.exact_tag()
    }
}
