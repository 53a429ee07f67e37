//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Tool`] - One of the known tools whose patches can be checked
//! - [`PatchId`] - Validated patch identifier (a catalog directory name)
//! - [`PatchSelection`] - Which patches a run should evaluate
//! - [`VerifyMode`] - Fast (short-circuit) or exhaustive verification
//! - [`StrategyKind`] - Which apply strategy decides a trial outcome
//! - [`Revision`] - Identity of the checked-out tool revision
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so configuration mistakes surface before any
//! trial touches a workspace.
//!
//! # Examples
//!
//! ```
//! use patchcheck::core::types::{PatchId, PatchSelection, Tool};
//!
//! let tool: Tool = "dwm".parse().unwrap();
//! assert_eq!(tool.patch_path(), "dwm.suckless.org/patches");
//!
//! let id = PatchId::new("systray").unwrap();
//! assert_eq!(id.as_str(), "systray");
//!
//! assert!(PatchSelection::parse("all").unwrap().is_all());
//! assert!("vim".parse::<Tool>().is_err());
//! assert!(PatchId::new("../escape").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown tool '{name}', must be one of: {valid}")]
    UnknownTool { name: String, valid: String },

    #[error("invalid patch id: {0}")]
    InvalidPatchId(String),

    #[error("invalid patch selection: {0}")]
    InvalidSelection(String),

    #[error("unknown mode '{0}', must be one of: fast, exhaustive")]
    UnknownMode(String),

    #[error("unknown apply strategy '{0}', must be one of: stderr, check")]
    UnknownStrategy(String),
}

/// A tool whose community patches can be checked.
///
/// The set is closed: each tool knows where its patches live inside the
/// catalog repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Dwm,
    St,
    Surf,
    Dmenu,
    Ii,
}

impl Tool {
    /// Every known tool, in display order.
    pub const ALL: [Tool; 5] = [Tool::Dwm, Tool::St, Tool::Surf, Tool::Dmenu, Tool::Ii];

    /// The tool's name, which is also its upstream repository name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Dwm => "dwm",
            Tool::St => "st",
            Tool::Surf => "surf",
            Tool::Dmenu => "dmenu",
            Tool::Ii => "ii",
        }
    }

    /// Location of the tool's patch root, relative to the catalog repository.
    ///
    /// # Example
    ///
    /// ```
    /// use patchcheck::core::types::Tool;
    ///
    /// assert_eq!(Tool::Dmenu.patch_path(), "tools.suckless.org/dmenu/patches");
    /// ```
    pub fn patch_path(&self) -> &'static str {
        match self {
            Tool::Dwm => "dwm.suckless.org/patches",
            Tool::St => "st.suckless.org/patches",
            Tool::Surf => "surf.suckless.org/patches",
            Tool::Dmenu => "tools.suckless.org/dmenu/patches",
            Tool::Ii => "tools.suckless.org/ii/patches",
        }
    }
}

/// Names of all known tools, for error messages and help text.
pub fn valid_tool_names() -> Vec<&'static str> {
    Tool::ALL.iter().map(Tool::as_str).collect()
}

impl FromStr for Tool {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| TypeError::UnknownTool {
                name: s.to_string(),
                valid: valid_tool_names().join(", "),
            })
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated patch identifier.
///
/// A patch id names one immediate subdirectory of a tool's patch root, so it
/// must be a single path component:
/// - Cannot be empty
/// - Cannot be `.` or `..`
/// - Cannot contain `/` or `\`
/// - Cannot contain ASCII control characters or surrounding whitespace
///
/// # Example
///
/// ```
/// use patchcheck::core::types::PatchId;
///
/// assert!(PatchId::new("alpha").is_ok());
/// assert!(PatchId::new("").is_err());
/// assert!(PatchId::new("..").is_err());
/// assert!(PatchId::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatchId(String);

impl PatchId {
    /// Create a new validated patch id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPatchId` if the id is not a single,
    /// plain path component.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.is_empty() {
            return Err(TypeError::InvalidPatchId(
                "patch id cannot be empty".into(),
            ));
        }
        if id == "." || id == ".." {
            return Err(TypeError::InvalidPatchId(format!(
                "patch id cannot be '{id}'"
            )));
        }
        if id.contains('/') || id.contains('\\') {
            return Err(TypeError::InvalidPatchId(format!(
                "patch id cannot contain a path separator: '{id}'"
            )));
        }
        if id.trim() != id {
            return Err(TypeError::InvalidPatchId(format!(
                "patch id cannot have surrounding whitespace: '{id}'"
            )));
        }
        if id.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidPatchId(
                "patch id cannot contain control characters".into(),
            ));
        }
        Ok(())
    }

    /// Get the patch id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PatchId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PatchId> for String {
    fn from(id: PatchId) -> Self {
        id.0
    }
}

impl AsRef<str> for PatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which patches a run evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PatchSelection {
    /// Every patch directory found in the catalog.
    #[default]
    All,
    /// An explicit list, in caller order, without duplicates.
    Explicit(Vec<PatchId>),
}

impl PatchSelection {
    /// Parse `all` or a comma-separated list of patch ids.
    ///
    /// Duplicate ids collapse to their first occurrence. Empty entries
    /// (for example a trailing comma) are rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use patchcheck::core::types::{PatchId, PatchSelection};
    ///
    /// let sel = PatchSelection::parse("systray, alpha,systray").unwrap();
    /// assert_eq!(
    ///     sel,
    ///     PatchSelection::Explicit(vec![
    ///         PatchId::new("systray").unwrap(),
    ///         PatchId::new("alpha").unwrap(),
    ///     ])
    /// );
    /// assert!(PatchSelection::parse("a,,b").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let input = input.trim();
        if input == "all" {
            return Ok(PatchSelection::All);
        }
        if input.is_empty() {
            return Err(TypeError::InvalidSelection(
                "patch list cannot be empty".into(),
            ));
        }

        let mut ids: Vec<PatchId> = Vec::new();
        for raw in input.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(TypeError::InvalidSelection(format!(
                    "empty entry in patch list '{input}'"
                )));
            }
            let id = PatchId::new(raw)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(PatchSelection::Explicit(ids))
    }

    /// Check whether every catalog patch is selected.
    pub fn is_all(&self) -> bool {
        matches!(self, PatchSelection::All)
    }
}

impl FromStr for PatchSelection {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PatchSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchSelection::All => f.write_str("all"),
            PatchSelection::Explicit(ids) => {
                let names: Vec<&str> = ids.iter().map(PatchId::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

/// How many diff variants of a patch are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Stop at the first variant that applies cleanly.
    #[default]
    Fast,
    /// Try every variant and keep every outcome.
    Exhaustive,
}

impl VerifyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyMode::Fast => "fast",
            VerifyMode::Exhaustive => "exhaustive",
        }
    }

    pub fn is_exhaustive(&self) -> bool {
        matches!(self, VerifyMode::Exhaustive)
    }
}

impl FromStr for VerifyMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(VerifyMode::Fast),
            "exhaustive" => Ok(VerifyMode::Exhaustive),
            other => Err(TypeError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which apply strategy classifies a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    /// Run `git apply` and treat any stderr output as failure.
    #[default]
    Stderr,
    /// Check-only apply through libgit2; no working tree changes.
    Check,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Stderr => "stderr",
            StrategyKind::Check => "check",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stderr" => Ok(StrategyKind::Stderr),
            "check" => Ok(StrategyKind::Check),
            other => Err(TypeError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the checked-out tool revision.
///
/// # Example
///
/// ```
/// use patchcheck::core::types::Revision;
///
/// let untagged = Revision::new("138b405", None);
/// assert_eq!(untagged.descriptor(), "138b405");
///
/// let tagged = Revision::new("7a7c4a5", Some("6.5".to_string()));
/// assert_eq!(tagged.descriptor(), "6.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    /// Abbreviated commit hash of HEAD.
    pub short_hash: String,
    /// Tag pointing exactly at HEAD, if any.
    pub tag: Option<String>,
}

impl Revision {
    pub fn new(short_hash: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            short_hash: short_hash.into(),
            tag,
        }
    }

    /// The tag when HEAD sits exactly on one, else the short hash.
    pub fn descriptor(&self) -> &str {
        self.tag.as_deref().unwrap_or(&self.short_hash)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{} ({})", tag, self.short_hash),
            None => f.write_str(&self.short_hash),
        }
    }
}
