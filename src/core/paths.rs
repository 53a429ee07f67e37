//! core::paths
//!
//! Centralized path routing for checkouts, locks and report files.
//!
//! # Layout
//!
//! Unless overridden on the command line, checkouts live under a single
//! workspace root:
//! - `<root>/<tool>/` - the tool's source checkout (the apply target)
//! - `<root>/<catalog_repo>/` - the patch catalog checkout
//!
//! Inside a tool checkout patchcheck owns two paths:
//! - `<checkout>/.git/patchcheck.lock` - exclusive run lock
//! - `<checkout>/.patchcheck-trial.diff` - the diff staged for a trial
//!
//! **Hard rule:** no code outside this module builds these paths by hand.
//!
//! # Example
//!
//! ```
//! use patchcheck::core::paths::CheckoutPaths;
//! use patchcheck::core::types::Tool;
//! use std::path::PathBuf;
//!
//! let paths = CheckoutPaths::new(PathBuf::from("/data/patchcheck"), "sites");
//! assert_eq!(paths.tool_dir(Tool::Dwm), PathBuf::from("/data/patchcheck/dwm"));
//! assert_eq!(paths.catalog_dir(), PathBuf::from("/data/patchcheck/sites"));
//! ```

use std::path::{Path, PathBuf};

use crate::core::types::{PatchSelection, Revision, Tool, VerifyMode};

/// File name of the diff staged into a workspace for a trial.
pub const STAGED_DIFF_NAME: &str = ".patchcheck-trial.diff";

/// File name of the workspace lock inside the `.git` directory.
pub const LOCK_FILE_NAME: &str = "patchcheck.lock";

/// Default checkout locations under a workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPaths {
    /// Directory holding all checkouts.
    pub root: PathBuf,
    /// Directory name of the catalog checkout.
    pub catalog_repo: String,
}

impl CheckoutPaths {
    pub fn new(root: PathBuf, catalog_repo: impl Into<String>) -> Self {
        Self {
            root,
            catalog_repo: catalog_repo.into(),
        }
    }

    /// Default checkout of a tool's source tree.
    pub fn tool_dir(&self, tool: Tool) -> PathBuf {
        self.root.join(tool.as_str())
    }

    /// Default checkout of the patch catalog.
    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join(&self.catalog_repo)
    }
}

/// Version-control metadata directory of a checkout.
pub fn git_dir(checkout: &Path) -> PathBuf {
    checkout.join(".git")
}

/// Lock file guarding a checkout for the duration of a run.
pub fn lock_path(checkout: &Path) -> PathBuf {
    git_dir(checkout).join(LOCK_FILE_NAME)
}

/// Where a trial stages its diff inside the checkout.
pub fn staged_diff_path(checkout: &Path) -> PathBuf {
    checkout.join(STAGED_DIFF_NAME)
}

/// Default report file name for a run.
///
/// `<tool>-<descriptor>[-patches][-diffs]-broken.md`, where `-patches` marks
/// an explicit selection and `-diffs` marks exhaustive mode.
///
/// # Example
///
/// ```
/// use patchcheck::core::paths::report_file_name;
/// use patchcheck::core::types::{PatchSelection, Revision, Tool, VerifyMode};
///
/// let rev = Revision::new("138b405", None);
/// assert_eq!(
///     report_file_name(Tool::Dwm, &rev, &PatchSelection::All, VerifyMode::Fast),
///     "dwm-138b405-broken.md"
/// );
///
/// let tagged = Revision::new("138b405", Some("6.5".to_string()));
/// let some = PatchSelection::parse("alpha").unwrap();
/// assert_eq!(
///     report_file_name(Tool::St, &tagged, &some, VerifyMode::Exhaustive),
///     "st-6.5-patches-diffs-broken.md"
/// );
/// ```
pub fn report_file_name(
    tool: Tool,
    revision: &Revision,
    selection: &PatchSelection,
    mode: VerifyMode,
) -> String {
    let mut name = format!("{}-{}", tool, revision.descriptor());
    if !selection.is_all() {
        name.push_str("-patches");
    }
    if mode.is_exhaustive() {
        name.push_str("-diffs");
    }
    name.push_str("-broken.md");
    name
}
