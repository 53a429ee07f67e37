//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order of precedence:
//! 1. `$PATCHCHECK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/patchcheck/config.toml`
//! 3. `~/.patchcheck/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing so that a typo in the file
//! fails the run before any repository is touched.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{StrategyKind, VerifyMode};

/// User configuration.
///
/// # Example
///
/// ```toml
/// upstream = "git://git.suckless.org/"
/// catalog_repo = "sites"
/// workspace_root = "/home/me/.local/share/patchcheck"
/// mainline = "master"
/// mode = "fast"
/// apply_strategy = "stderr"
/// extensions = ["diff"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Base URL that tool and catalog repository names are appended to
    pub upstream: Option<String>,

    /// Name of the catalog repository under `upstream`
    pub catalog_repo: Option<String>,

    /// Directory holding the tool checkouts and the catalog checkout
    pub workspace_root: Option<PathBuf>,

    /// Default revision to check out, and the branch refreshed from upstream
    pub mainline: Option<String>,

    /// Default verification mode
    pub mode: Option<String>,

    /// Default apply strategy
    pub apply_strategy: Option<String>,

    /// File extensions recognized as diff variants (without the dot)
    pub extensions: Option<Vec<String>>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("upstream", &self.upstream),
            ("catalog_repo", &self.catalog_repo),
            ("mainline", &self.mainline),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!("{key} cannot be empty")));
                }
            }
        }

        if let Some(mode) = &self.mode {
            mode.parse::<VerifyMode>()
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        if let Some(strategy) = &self.apply_strategy {
            strategy
                .parse::<StrategyKind>()
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        if let Some(extensions) = &self.extensions {
            if extensions.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "extensions cannot be an empty list".to_string(),
                ));
            }
            for ext in extensions {
                if ext.is_empty() || ext.contains('.') {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid extension '{ext}', expected a bare name like \"diff\""
                    )));
                }
            }
        }

        Ok(())
    }
}
