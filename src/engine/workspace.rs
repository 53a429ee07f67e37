//! engine::workspace
//!
//! Retrieval, refresh and locking of the tool checkout that trials run in.
//!
//! # Architecture
//!
//! [`WorkspaceProvider`] drives a [`VcsProvider`] to bring both checkouts
//! up to date and put the tool tree at the requested revision. The result is
//! a [`Workspace`]: a locked handle that trials borrow mutably.
//!
//! ```text
//! ensure_clone -> lock -> refresh -> reset/clean -> checkout -> identify
//! ```
//!
//! # Invariants
//!
//! - At most one run holds a given checkout (see [`CheckoutLock`])
//! - The tool tree is pristine when [`WorkspaceProvider::prepare`] returns
//! - With refresh disabled nothing is cloned or pulled

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::lock::{CheckoutLock, LockError};
use crate::core::paths;
use crate::core::types::Revision;
use crate::git::{GitError, VcsProvider};

/// Errors from workspace preparation and restoration.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A checkout path is occupied by a regular file.
    #[error("cannot use {path} as a checkout: it is a file")]
    PathIsFile { path: PathBuf },

    /// A checkout directory does not exist and cloning is disabled.
    #[error("checkout not found at {path} (run without --no-refresh to clone it)")]
    MissingCheckout { path: PathBuf },

    /// A directory exists but has no version-control metadata.
    #[error("{path} is not a git checkout")]
    NotACheckout { path: PathBuf },

    /// Another run holds the checkout.
    #[error("workspace is locked: {path}")]
    Locked { path: PathBuf },

    /// The lock could not be taken for another reason.
    #[error("failed to lock workspace: {0}")]
    Lock(#[source] LockError),

    #[error("failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: GitError,
    },

    #[error("failed to refresh {path}: {source}")]
    Refresh {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    #[error("failed to check out {revision}: {source}")]
    Checkout {
        revision: String,
        #[source]
        source: GitError,
    },

    #[error("failed to identify revision in {path}: {source}")]
    Identify {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    /// The tree could not be returned to a clean state after a trial.
    #[error("failed to restore workspace {path}: {source}")]
    Restore {
        path: PathBuf,
        #[source]
        source: GitError,
    },
}

impl From<LockError> for WorkspaceError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::AlreadyLocked(path) => WorkspaceError::Locked { path },
            other => WorkspaceError::Lock(other),
        }
    }
}

/// A locked tool checkout.
///
/// Holding a `Workspace` means holding its lock. The lock is released when
/// the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    _lock: CheckoutLock,
}

impl Workspace {
    /// Lock the checkout at `path`.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::MissingCheckout`] if `path` does not exist
    /// - [`WorkspaceError::NotACheckout`] if `path` has no `.git` directory
    /// - [`WorkspaceError::Locked`] if another run holds the checkout
    pub fn open(path: &Path) -> Result<Self, WorkspaceError> {
        if !path.exists() {
            return Err(WorkspaceError::MissingCheckout {
                path: path.to_path_buf(),
            });
        }
        if !paths::git_dir(path).is_dir() {
            return Err(WorkspaceError::NotACheckout {
                path: path.to_path_buf(),
            });
        }

        let lock = CheckoutLock::acquire(path)?;
        debug!(lock = %lock.path().display(), "workspace locked");
        Ok(Self {
            path: path.to_path_buf(),
            _lock: lock,
        })
    }

    /// Root of the checkout.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What [`WorkspaceProvider::prepare`] should set up.
#[derive(Debug, Clone)]
pub struct WorkspaceRequest {
    pub tool_url: String,
    pub tool_path: PathBuf,
    pub catalog_url: String,
    pub catalog_path: PathBuf,
    /// Revision to check out in the tool tree.
    pub revision: String,
    /// Branch pulled on refresh.
    pub mainline: String,
    /// Clone and pull before checking out. When false, both checkouts must
    /// already exist and the catalog is left untouched.
    pub refresh: bool,
}

/// A workspace ready for trials, and the revision it is at.
#[derive(Debug)]
pub struct PreparedWorkspace {
    pub workspace: Workspace,
    pub revision: Revision,
}

/// Brings checkouts into the state a run needs.
pub struct WorkspaceProvider<'a> {
    vcs: &'a dyn VcsProvider,
}

impl<'a> WorkspaceProvider<'a> {
    pub fn new(vcs: &'a dyn VcsProvider) -> Self {
        Self { vcs }
    }

    /// Clone `url` into `path` unless a directory is already there.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::PathIsFile`] if `path` is a regular file
    /// - [`WorkspaceError::Clone`] if cloning fails
    pub fn ensure_clone(&self, url: &str, path: &Path) -> Result<(), WorkspaceError> {
        if path.is_file() {
            return Err(WorkspaceError::PathIsFile {
                path: path.to_path_buf(),
            });
        }
        if path.is_dir() {
            debug!(path = %path.display(), "reusing existing checkout");
            return Ok(());
        }

        info!(url, path = %path.display(), "cloning");
        self.vcs
            .clone_repo(url, path)
            .map_err(|e| WorkspaceError::Clone {
                url: url.to_string(),
                source: e,
            })
    }

    /// Pull `branch` from origin, then reset and clean the tree.
    ///
    /// # Errors
    ///
    /// - [`WorkspaceError::NotACheckout`] if `path` has no `.git` directory
    /// - [`WorkspaceError::Refresh`] if pulling or cleaning fails
    pub fn refresh(&self, path: &Path, branch: &str) -> Result<(), WorkspaceError> {
        if !paths::git_dir(path).is_dir() {
            return Err(WorkspaceError::NotACheckout {
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), branch, "refreshing");
        let refresh_err = |e: GitError| WorkspaceError::Refresh {
            path: path.to_path_buf(),
            source: e,
        };
        self.vcs.pull(path, branch).map_err(refresh_err)?;
        self.reset_and_clean(path).map_err(refresh_err)
    }

    /// Check out `revision` (branch, tag or commit) in the tree at `path`.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::Checkout`] if the revision is unknown or the
    /// checkout fails.
    pub fn checkout(&self, path: &Path, revision: &str) -> Result<(), WorkspaceError> {
        self.vcs
            .checkout(path, revision)
            .map_err(|e| WorkspaceError::Checkout {
                revision: revision.to_string(),
                source: e,
            })
    }

    /// Short hash and exact tag of HEAD.
    pub fn identify(&self, path: &Path) -> Result<Revision, WorkspaceError> {
        let identify_err = |e: GitError| WorkspaceError::Identify {
            path: path.to_path_buf(),
            source: e,
        };
        let hash = self.vcs.identify_revision(path).map_err(identify_err)?;
        let tag = self.vcs.describe_tag(path).map_err(identify_err)?;
        Ok(Revision::new(hash, tag))
    }

    /// Run the full preparation sequence for a request.
    ///
    /// # Errors
    ///
    /// Any [`WorkspaceError`] from the individual steps. With refresh
    /// disabled, a missing tool or catalog directory is
    /// [`WorkspaceError::MissingCheckout`].
    pub fn prepare(&self, request: &WorkspaceRequest) -> Result<PreparedWorkspace, WorkspaceError> {
        if request.refresh {
            self.ensure_clone(&request.tool_url, &request.tool_path)?;
            self.ensure_clone(&request.catalog_url, &request.catalog_path)?;
        } else if !request.catalog_path.is_dir() {
            return Err(WorkspaceError::MissingCheckout {
                path: request.catalog_path.clone(),
            });
        }

        let workspace = Workspace::open(&request.tool_path)?;

        if request.refresh {
            self.refresh(workspace.path(), &request.mainline)?;
            self.refresh(&request.catalog_path, &request.mainline)?;
        }

        self.reset_and_clean(workspace.path())
            .map_err(|e| WorkspaceError::Restore {
                path: workspace.path().to_path_buf(),
                source: e,
            })?;
        self.checkout(workspace.path(), &request.revision)?;
        let revision = self.identify(workspace.path())?;

        info!(revision = %revision, path = %workspace.path().display(), "workspace ready");
        Ok(PreparedWorkspace {
            workspace,
            revision,
        })
    }

    fn reset_and_clean(&self, path: &Path) -> Result<(), GitError> {
        self.vcs.hard_reset(path)?;
        self.vcs.clean(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{FailOn, MockOperation, MockVcs};
    use std::fs;
    use tempfile::TempDir;

    fn request(root: &Path, refresh: bool) -> WorkspaceRequest {
        WorkspaceRequest {
            tool_url: "git://example.org/dwm".into(),
            tool_path: root.join("dwm"),
            catalog_url: "git://example.org/sites".into(),
            catalog_path: root.join("sites"),
            revision: "master".into(),
            mainline: "master".into(),
            refresh,
        }
    }

    fn make_checkout(path: &Path) {
        fs::create_dir_all(paths::git_dir(path)).unwrap();
    }

    mod workspace {
        use super::*;

        #[test]
        fn open_requires_git_dir() {
            let dir = TempDir::new().unwrap();
            let plain = dir.path().join("plain");
            fs::create_dir(&plain).unwrap();
            assert!(matches!(
                Workspace::open(&plain),
                Err(WorkspaceError::NotACheckout { .. })
            ));
            assert!(matches!(
                Workspace::open(&dir.path().join("absent")),
                Err(WorkspaceError::MissingCheckout { .. })
            ));
        }

        #[test]
        fn second_open_is_locked_out() {
            let dir = TempDir::new().unwrap();
            make_checkout(dir.path());
            let _first = Workspace::open(dir.path()).unwrap();
            let err = Workspace::open(dir.path()).unwrap_err();
            assert!(matches!(err, WorkspaceError::Locked { .. }));
            assert!(err.to_string().contains("workspace is locked"));
        }

        #[test]
        fn lock_released_with_workspace() {
            let dir = TempDir::new().unwrap();
            make_checkout(dir.path());
            drop(Workspace::open(dir.path()).unwrap());
            assert!(Workspace::open(dir.path()).is_ok());
        }
    }

    mod provider {
        use super::*;

        #[test]
        fn ensure_clone_clones_missing_path() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            let target = dir.path().join("dwm");
            WorkspaceProvider::new(&vcs)
                .ensure_clone("git://x/dwm", &target)
                .unwrap();
            assert_eq!(
                vcs.operations(),
                vec![MockOperation::Clone {
                    url: "git://x/dwm".into(),
                    dest: target,
                }]
            );
        }

        #[test]
        fn ensure_clone_reuses_directory() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            WorkspaceProvider::new(&vcs)
                .ensure_clone("git://x/dwm", dir.path())
                .unwrap();
            assert!(vcs.operations().is_empty());
        }

        #[test]
        fn ensure_clone_rejects_file() {
            let dir = TempDir::new().unwrap();
            let file = dir.path().join("dwm");
            fs::write(&file, "").unwrap();
            let vcs = MockVcs::new();
            assert!(matches!(
                WorkspaceProvider::new(&vcs).ensure_clone("git://x/dwm", &file),
                Err(WorkspaceError::PathIsFile { .. })
            ));
        }

        #[test]
        fn refresh_requires_checkout() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            assert!(matches!(
                WorkspaceProvider::new(&vcs).refresh(dir.path(), "master"),
                Err(WorkspaceError::NotACheckout { .. })
            ));
            assert!(vcs.operations().is_empty());
        }

        #[test]
        fn refresh_pulls_then_restores() {
            let dir = TempDir::new().unwrap();
            make_checkout(dir.path());
            let vcs = MockVcs::new();
            WorkspaceProvider::new(&vcs)
                .refresh(dir.path(), "main")
                .unwrap();
            let path = dir.path().to_path_buf();
            assert_eq!(
                vcs.operations(),
                vec![
                    MockOperation::Pull {
                        path: path.clone(),
                        branch: "main".into(),
                    },
                    MockOperation::HardReset { path: path.clone() },
                    MockOperation::Clean { path },
                ]
            );
        }

        #[test]
        fn unknown_revision_is_checkout_error() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new().with_revision("6.5", "abc1234", Some("6.5"));
            assert!(matches!(
                WorkspaceProvider::new(&vcs).checkout(dir.path(), "nope"),
                Err(WorkspaceError::Checkout { .. })
            ));
        }

        #[test]
        fn identify_combines_hash_and_tag() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new().with_head("138b405", Some("6.5"));
            let rev = WorkspaceProvider::new(&vcs).identify(dir.path()).unwrap();
            assert_eq!(rev.descriptor(), "6.5");
            assert_eq!(rev.short_hash, "138b405");
        }
    }

    mod prepare {
        use super::*;

        #[test]
        fn full_sequence_with_refresh() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new().with_revision("master", "138b405", None);
            let req = request(dir.path(), true);

            let prepared = WorkspaceProvider::new(&vcs).prepare(&req).unwrap();
            assert_eq!(prepared.revision.descriptor(), "138b405");
            assert_eq!(prepared.workspace.path(), req.tool_path);

            let ops = vcs.operations();
            assert!(matches!(ops[0], MockOperation::Clone { .. }));
            assert!(matches!(ops[1], MockOperation::Clone { .. }));
            assert!(ops.contains(&MockOperation::Pull {
                path: req.catalog_path.clone(),
                branch: "master".into(),
            }));
            assert!(ops.contains(&MockOperation::Checkout {
                path: req.tool_path.clone(),
                revision: "master".into(),
            }));
        }

        #[test]
        fn no_refresh_never_touches_network_or_catalog() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            let req = request(dir.path(), false);
            make_checkout(&req.tool_path);
            fs::create_dir_all(&req.catalog_path).unwrap();

            WorkspaceProvider::new(&vcs).prepare(&req).unwrap();

            for op in vcs.operations() {
                match &op {
                    MockOperation::Clone { .. } | MockOperation::Pull { .. } => {
                        panic!("unexpected network operation: {op:?}")
                    }
                    MockOperation::HardReset { path }
                    | MockOperation::Clean { path }
                    | MockOperation::Checkout { path, .. } => assert_eq!(path, &req.tool_path),
                    _ => {}
                }
            }
        }

        #[test]
        fn no_refresh_with_missing_tool_checkout() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            let req = request(dir.path(), false);
            fs::create_dir_all(&req.catalog_path).unwrap();
            assert!(matches!(
                WorkspaceProvider::new(&vcs).prepare(&req),
                Err(WorkspaceError::MissingCheckout { .. })
            ));
        }

        #[test]
        fn no_refresh_with_missing_catalog() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            let req = request(dir.path(), false);
            make_checkout(&req.tool_path);
            let err = WorkspaceProvider::new(&vcs).prepare(&req).unwrap_err();
            match err {
                WorkspaceError::MissingCheckout { path } => assert_eq!(path, req.catalog_path),
                other => panic!("expected MissingCheckout, got {other:?}"),
            }
        }

        #[test]
        fn failed_pull_aborts() {
            let dir = TempDir::new().unwrap();
            let vcs = MockVcs::new();
            vcs.fail_on(FailOn::Pull);
            let req = request(dir.path(), true);
            assert!(matches!(
                WorkspaceProvider::new(&vcs).prepare(&req),
                Err(WorkspaceError::Refresh { .. })
            ));
        }
    }
}
