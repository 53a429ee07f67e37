//! git::mock
//!
//! In-memory version-control provider for deterministic testing.
//!
//! # Design
//!
//! `MockVcs` implements [`VcsProvider`] without touching real repositories.
//! It records every call so tests can assert on ordering (for example that
//! every trial ends with a reset, a clean and an ignored-file sweep), and it
//! can be told to fail a chosen operation. The only filesystem effect is
//! `clone_repo`, which creates the destination directory with an empty
//! `.git` so later steps see a checkout. No file is ever reported ignored.
//!
//! # Example
//!
//! ```
//! use patchcheck::git::mock::{MockOperation, MockVcs};
//! use patchcheck::git::VcsProvider;
//! use std::path::Path;
//!
//! let vcs = MockVcs::new().with_head("138b405", Some("6.5"));
//! vcs.hard_reset(Path::new("/work/dwm")).unwrap();
//!
//! assert_eq!(vcs.identify_revision(Path::new("/work/dwm")).unwrap(), "138b405");
//! assert_eq!(
//!     vcs.operations()[0],
//!     MockOperation::HardReset { path: "/work/dwm".into() }
//! );
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{GitError, VcsProvider};
use crate::core::paths;

/// Mock provider for testing.
///
/// Clones share state, so a test can keep one handle for inspection while
/// handing another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockVcs {
    inner: Arc<Mutex<MockVcsInner>>,
}

#[derive(Debug, Default)]
struct MockVcsInner {
    /// Short hash reported for HEAD.
    head: String,
    /// Tag reported for HEAD.
    tag: Option<String>,
    /// Known revisions; when empty, every checkout succeeds.
    revisions: HashMap<String, (String, Option<String>)>,
    /// Operation to fail.
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Which operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Clone,
    Pull,
    Checkout,
    HardReset,
    Clean,
    SnapshotIgnored,
    RemoveIgnored,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Clone { url: String, dest: PathBuf },
    Pull { path: PathBuf, branch: String },
    Checkout { path: PathBuf, revision: String },
    HardReset { path: PathBuf },
    Clean { path: PathBuf },
    SnapshotIgnored { path: PathBuf },
    RemoveIgnored { path: PathBuf },
    IdentifyRevision { path: PathBuf },
    DescribeTag { path: PathBuf },
}

impl MockVcs {
    /// Create a mock whose HEAD is `0000000` with no tag.
    pub fn new() -> Self {
        Self::default().with_head("0000000", None)
    }

    /// Set the HEAD the mock reports.
    pub fn with_head(self, short_hash: &str, tag: Option<&str>) -> Self {
        {
            let mut inner = self.state();
            inner.head = short_hash.to_string();
            inner.tag = tag.map(str::to_string);
        }
        self
    }

    /// Register a revision that `checkout` accepts and the HEAD it moves to.
    ///
    /// Once any revision is registered, unknown revisions fail to check out.
    pub fn with_revision(self, revision: &str, short_hash: &str, tag: Option<&str>) -> Self {
        self.state().revisions.insert(
            revision.to_string(),
            (short_hash.to_string(), tag.map(str::to_string)),
        );
        self
    }

    /// Make an operation fail from now on.
    pub fn fail_on(&self, op: FailOn) {
        self.state().fail_on = Some(op);
    }

    /// Stop failing operations.
    pub fn clear_failure(&self) {
        self.state().fail_on = None;
    }

    /// Operations recorded so far, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Forget recorded operations.
    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    fn state(&self) -> MutexGuard<'_, MockVcsInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: MockOperation, kind: Option<FailOn>) -> Result<(), GitError> {
        let mut inner = self.state();
        inner.operations.push(op);
        match (kind, inner.fail_on) {
            (Some(kind), Some(failing)) if kind == failing => Err(GitError::CommandFailed {
                command: format!("mock {kind:?}"),
                stderr: "injected failure".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl VcsProvider for MockVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.record(
            MockOperation::Clone {
                url: url.to_string(),
                dest: dest.to_path_buf(),
            },
            Some(FailOn::Clone),
        )?;
        let git_dir = paths::git_dir(dest);
        fs::create_dir_all(&git_dir).map_err(|e| GitError::Io {
            path: git_dir,
            source: e,
        })
    }

    fn pull(&self, path: &Path, branch: &str) -> Result<(), GitError> {
        self.record(
            MockOperation::Pull {
                path: path.to_path_buf(),
                branch: branch.to_string(),
            },
            Some(FailOn::Pull),
        )
    }

    fn checkout(&self, path: &Path, revision: &str) -> Result<(), GitError> {
        self.record(
            MockOperation::Checkout {
                path: path.to_path_buf(),
                revision: revision.to_string(),
            },
            Some(FailOn::Checkout),
        )?;

        let mut inner = self.state();
        if inner.revisions.is_empty() {
            return Ok(());
        }
        match inner.revisions.get(revision).cloned() {
            Some((head, tag)) => {
                inner.head = head;
                inner.tag = tag;
                Ok(())
            }
            None => Err(GitError::RevisionNotFound {
                revision: revision.to_string(),
            }),
        }
    }

    fn hard_reset(&self, path: &Path) -> Result<(), GitError> {
        self.record(
            MockOperation::HardReset {
                path: path.to_path_buf(),
            },
            Some(FailOn::HardReset),
        )
    }

    fn clean(&self, path: &Path) -> Result<(), GitError> {
        self.record(
            MockOperation::Clean {
                path: path.to_path_buf(),
            },
            Some(FailOn::Clean),
        )
    }

    fn ignored_paths(&self, path: &Path) -> Result<BTreeSet<PathBuf>, GitError> {
        self.record(
            MockOperation::SnapshotIgnored {
                path: path.to_path_buf(),
            },
            Some(FailOn::SnapshotIgnored),
        )?;
        Ok(BTreeSet::new())
    }

    fn remove_ignored(&self, path: &Path, _keep: &BTreeSet<PathBuf>) -> Result<(), GitError> {
        self.record(
            MockOperation::RemoveIgnored {
                path: path.to_path_buf(),
            },
            Some(FailOn::RemoveIgnored),
        )
    }

    fn identify_revision(&self, path: &Path) -> Result<String, GitError> {
        self.record(
            MockOperation::IdentifyRevision {
                path: path.to_path_buf(),
            },
            None,
        )?;
        Ok(self.state().head.clone())
    }

    fn describe_tag(&self, path: &Path) -> Result<Option<String>, GitError> {
        self.record(
            MockOperation::DescribeTag {
                path: path.to_path_buf(),
            },
            None,
        )?;
        Ok(self.state().tag.clone())
    }
}
