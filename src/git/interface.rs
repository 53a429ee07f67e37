//! git::interface
//!
//! Local repository operations using git2.
//!
//! This module wraps everything patchcheck does to a checkout that does not
//! need the network or the `git` binary: checking out revisions, resetting
//! and cleaning the working tree, identifying HEAD, and check-only applies.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: The path has no repository metadata
//! - [`GitError::RevisionNotFound`]: A requested revision does not resolve
//! - [`GitError::CommandFailed`]: The `git` binary exited unsuccessfully
//! - [`GitError::Launch`]: The `git` binary could not be started
//!
//! # Example
//!
//! ```ignore
//! use patchcheck::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/work/dwm"))?;
//! git.checkout("6.5")?;
//! println!("at {}", git.short_head()?);
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Path is not the root of a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported: {path}")]
    BareRepo {
        /// The repository path
        path: PathBuf,
    },

    /// A revision could not be resolved.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// The revision as given by the caller
        revision: String,
    },

    /// The git binary ran but reported failure.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Trimmed stderr of the command
        stderr: String,
    },

    /// The git binary could not be started.
    #[error("failed to run `{command}`: {source}")]
    Launch {
        /// The command line that was attempted
        command: String,
        source: std::io::Error,
    },

    /// Filesystem error while manipulating the working tree.
    #[error("working tree i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        GitError::Internal {
            message: format!("{}: {}", context, err.message()),
        }
    }
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked (non-ignored) files
    pub untracked: usize,
}

impl WorktreeStatus {
    /// Check if the tree matches HEAD exactly, untracked files included.
    pub fn is_pristine(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0
    }
}

/// Result of a check-only apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyCheck {
    /// The diff would apply to the working tree.
    Applies,
    /// The diff would not apply; the reason is libgit2's message.
    Rejected(String),
}

/// A local Git repository with a working directory.
pub struct Git {
    repo: git2::Repository,
    work_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Opening
    // =========================================================================

    /// Open the repository rooted exactly at `path`.
    ///
    /// Unlike discovery, this does not walk up to a parent repository: a
    /// checkout directory without its own `.git` is an error.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a repository root
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        let work_dir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepo {
                path: path.to_path_buf(),
            })?
            .to_path_buf();

        Ok(Self { repo, work_dir })
    }

    /// Path to the working directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    // =========================================================================
    // Revision Identity
    // =========================================================================

    /// Abbreviated hash of the HEAD commit (as `git rev-parse --short HEAD`).
    pub fn short_head(&self) -> Result<String, GitError> {
        let commit = self.head_commit()?;
        let short = commit
            .as_object()
            .short_id()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        short
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GitError::Internal {
                message: "short id is not valid UTF-8".to_string(),
            })
    }

    /// Tag pointing exactly at HEAD, if any.
    ///
    /// Lightweight and annotated tags both count. A HEAD that is only
    /// reachable from a tag (like `6.5-3-gabc1234`) has no exact tag.
    pub fn exact_tag(&self) -> Result<Option<String>, GitError> {
        let mut opts = git2::DescribeOptions::new();
        opts.describe_tags().max_candidates_tags(0);

        let describe = match self.repo.describe(&opts) {
            Ok(describe) => describe,
            Err(e) => {
                debug!(work_dir = %self.work_dir.display(), "no exact tag at HEAD: {}", e.message());
                return Ok(None);
            }
        };

        describe
            .format(None)
            .map(Some)
            .map_err(|e| GitError::from_git2(e, "describe"))
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, "HEAD"))
    }

    // =========================================================================
    // Working Tree Mutation
    // =========================================================================

    /// Check out a revision (branch, tag, or commit), discarding local changes.
    ///
    /// Branches are checked out attached; anything else detaches HEAD.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if the revision does not resolve
    pub fn checkout(&self, revision: &str) -> Result<(), GitError> {
        let (object, reference) =
            self.repo
                .revparse_ext(revision)
                .map_err(|_| GitError::RevisionNotFound {
                    revision: revision.to_string(),
                })?;

        let mut builder = git2::build::CheckoutBuilder::new();
        builder.force();
        self.repo
            .checkout_tree(&object, Some(&mut builder))
            .map_err(|e| GitError::from_git2(e, revision))?;

        let moved = match reference.as_ref().and_then(|r| r.name()) {
            Some(name) if name.starts_with("refs/heads/") => self.repo.set_head(name),
            _ => {
                let commit = object
                    .peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, revision))?;
                self.repo.set_head_detached(commit.id())
            }
        };
        moved.map_err(|e| GitError::from_git2(e, revision))?;

        debug!(work_dir = %self.work_dir.display(), revision, "checked out");
        Ok(())
    }

    /// Reset index and working tree to HEAD (as `git reset --hard`).
    pub fn reset_hard(&self) -> Result<(), GitError> {
        let commit = self.head_commit()?;
        self.repo
            .reset(commit.as_object(), git2::ResetType::Hard, None)
            .map_err(|e| GitError::from_git2(e, "reset --hard"))
    }

    /// Remove untracked, non-ignored files, including files inside untracked
    /// directories, then remove directories left empty.
    ///
    /// Returns the number of files removed.
    pub fn clean_untracked(&self) -> Result<usize, GitError> {
        let untracked = self.untracked_paths()?;
        self.remove_files(&untracked)?;
        Ok(untracked.len())
    }

    /// Ignored files in the working tree, relative to the working directory.
    ///
    /// Ignored directories are expanded to the files inside them.
    pub fn ignored_paths(&self) -> Result<BTreeSet<PathBuf>, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(true)
            .recurse_ignored_dirs(true)
            .exclude_submodules(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status().is_ignored())
            .filter_map(|entry| entry.path().map(PathBuf::from))
            .collect())
    }

    /// Remove ignored files that are not in `keep`, then remove directories
    /// left empty.
    ///
    /// Returns the number of files removed.
    pub fn remove_ignored_except(&self, keep: &BTreeSet<PathBuf>) -> Result<usize, GitError> {
        let added: Vec<PathBuf> = self
            .ignored_paths()?
            .into_iter()
            .filter(|path| !keep.contains(path))
            .collect();
        self.remove_files(&added)?;
        Ok(added.len())
    }

    fn remove_files(&self, relative_paths: &[PathBuf]) -> Result<(), GitError> {
        for relative in relative_paths {
            let path = self.work_dir.join(relative);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(GitError::Io { path, source: e }),
            }
            self.prune_empty_parents(&path);
        }
        Ok(())
    }

    /// Remove empty directories between `path` and the working directory.
    fn prune_empty_parents(&self, path: &Path) {
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == self.work_dir || !current.starts_with(&self.work_dir) {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the walk
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }

    fn untracked_paths(&self) -> Result<Vec<PathBuf>, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status().is_wt_new())
            .filter_map(|entry| entry.path().map(PathBuf::from))
            .collect())
    }

    /// Get working tree status summary, untracked files included.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, "status"))?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }

            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Check whether a diff would apply to the working directory without
    /// changing anything.
    ///
    /// A diff that libgit2 cannot parse is reported as rejected rather than
    /// as an error: it cannot apply either way.
    pub fn check_apply(&self, diff: &[u8]) -> Result<ApplyCheck, GitError> {
        let diff = match git2::Diff::from_buffer(diff) {
            Ok(diff) => diff,
            Err(e) => return Ok(ApplyCheck::Rejected(e.message().to_string())),
        };

        let mut opts = git2::ApplyOptions::new();
        opts.check(true);

        match self
            .repo
            .apply(&diff, git2::ApplyLocation::WorkDir, Some(&mut opts))
        {
            Ok(()) => Ok(ApplyCheck::Applies),
            Err(e) => Ok(ApplyCheck::Rejected(e.message().to_string())),
        }
    }
}
