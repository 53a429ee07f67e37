//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$PATCHCHECK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/patchcheck/config.toml`
//! 3. `~/.patchcheck/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use patchcheck::core::config::Config;
//! use patchcheck::core::types::Tool;
//!
//! let config = Config::load().unwrap();
//! println!("dwm upstream: {}", config.tool_url(Tool::Dwm));
//! println!("mainline: {}", config.mainline());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{StrategyKind, Tool, VerifyMode};

/// Default upstream base URL.
pub const DEFAULT_UPSTREAM: &str = "git://git.suckless.org/";

/// Default name of the catalog repository under the upstream.
pub const DEFAULT_CATALOG_REPO: &str = "sites";

/// Default revision and refresh branch.
pub const DEFAULT_MAINLINE: &str = "master";

/// Default diff-variant extension.
pub const DEFAULT_EXTENSION: &str = "diff";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no data directory available; set workspace_root in the config file")]
    NoDataDir,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw file contents
    pub global: GlobalConfig,
    /// Path the configuration was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. A missing file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Build a configuration from an in-memory value.
    pub fn from_global(global: GlobalConfig) -> Result<Self, ConfigError> {
        global.validate()?;
        Ok(Self { global, path: None })
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        // 1. Check $PATCHCHECK_CONFIG
        if let Ok(path) = std::env::var("PATCHCHECK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/patchcheck/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("patchcheck/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.patchcheck/config.toml
        dirs::home_dir()
            .map(|home| home.join(".patchcheck/config.toml"))
            .filter(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Base URL that repository names are appended to.
    pub fn upstream(&self) -> &str {
        self.global.upstream.as_deref().unwrap_or(DEFAULT_UPSTREAM)
    }

    /// Name of the catalog repository.
    pub fn catalog_repo(&self) -> &str {
        self.global
            .catalog_repo
            .as_deref()
            .unwrap_or(DEFAULT_CATALOG_REPO)
    }

    /// Clone URL of a tool's source repository.
    ///
    /// # Example
    ///
    /// ```
    /// use patchcheck::core::config::Config;
    /// use patchcheck::core::types::Tool;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.tool_url(Tool::St), "git://git.suckless.org/st");
    /// ```
    pub fn tool_url(&self, tool: Tool) -> String {
        join_url(self.upstream(), tool.as_str())
    }

    /// Clone URL of the catalog repository.
    pub fn catalog_url(&self) -> String {
        join_url(self.upstream(), self.catalog_repo())
    }

    /// Default revision and refresh branch.
    pub fn mainline(&self) -> &str {
        self.global.mainline.as_deref().unwrap_or(DEFAULT_MAINLINE)
    }

    /// Default verification mode.
    pub fn mode(&self) -> VerifyMode {
        self.global
            .mode
            .as_deref()
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    /// Default apply strategy.
    pub fn apply_strategy(&self) -> StrategyKind {
        self.global
            .apply_strategy
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Recognized diff-variant extensions.
    pub fn extensions(&self) -> Vec<String> {
        self.global
            .extensions
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_EXTENSION.to_string()])
    }

    /// Directory holding tool and catalog checkouts.
    ///
    /// Defaults to `<local data dir>/patchcheck`.
    pub fn workspace_root(&self) -> Result<PathBuf, ConfigError> {
        if let Some(root) = &self.global.workspace_root {
            return Ok(root.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("patchcheck"))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Get the path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn join_url(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.upstream(), DEFAULT_UPSTREAM);
        assert_eq!(config.catalog_url(), "git://git.suckless.org/sites");
        assert_eq!(config.mainline(), "master");
        assert_eq!(config.mode(), VerifyMode::Fast);
        assert_eq!(config.apply_strategy(), StrategyKind::Stderr);
        assert_eq!(config.extensions(), vec!["diff".to_string()]);
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            upstream = "https://example.org/git"
            mainline = "main"
            mode = "exhaustive"
            workspace_root = "/srv/patchcheck"
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tool_url(Tool::Dwm), "https://example.org/git/dwm");
        assert_eq!(config.mainline(), "main");
        assert_eq!(config.mode(), VerifyMode::Exhaustive);
        assert_eq!(
            config.workspace_root().unwrap(),
            PathBuf::from("/srv/patchcheck")
        );
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "upstream = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn invalid_values_rejected_on_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "apply_strategy = \"fuzzy\"").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn from_global_validates() {
        let global = GlobalConfig {
            extensions: Some(Vec::new()),
            ..Default::default()
        };
        assert!(Config::from_global(global).is_err());
    }
}
