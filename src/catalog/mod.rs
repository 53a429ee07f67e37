//! catalog
//!
//! Discovery of patches and their diff variants on disk.
//!
//! # Layout
//!
//! A tool's patch root holds one directory per patch. Every file below a
//! patch directory (at any depth) whose extension is recognized is one diff
//! variant of that patch:
//!
//! ```text
//! dwm.suckless.org/patches/
//!     alpha/
//!         index.md
//!         dwm-alpha-6.1.diff
//!         dwm-alpha-20230401-348f655.diff
//!     systray/
//!         dwm-systray-6.4.diff
//! ```
//!
//! # Invariants
//!
//! - Patches are listed in lexicographic order
//! - Variants of a patch are listed in lexicographic path order
//! - Unknown ids in an explicit selection are reported together, before
//!   any trial runs

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::core::config::DEFAULT_EXTENSION;
use crate::core::results::DiffVariant;
use crate::core::types::{PatchId, PatchSelection, Tool};

/// Errors from catalog discovery.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The patch root does not exist or is not a directory.
    #[error("patch catalog not found at {path}")]
    MissingRoot { path: PathBuf },

    /// An explicit selection names patches that are not in the catalog.
    #[error("unknown patch(es) {}: not found in {}", .patches.join(", "), .root.display())]
    UnknownPatches { patches: Vec<String>, root: PathBuf },

    /// Listing a directory failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One selected patch and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    pub id: PatchId,
    pub dir: PathBuf,
}

/// A tool's patch catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    extensions: Vec<String>,
}

impl Catalog {
    /// Catalog rooted at an arbitrary patch root, recognizing `.diff` files.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
        }
    }

    /// Catalog for `tool` inside a checkout of the catalog repository.
    ///
    /// # Example
    ///
    /// ```
    /// use patchcheck::catalog::Catalog;
    /// use patchcheck::core::types::Tool;
    /// use std::path::Path;
    ///
    /// let catalog = Catalog::for_tool(Path::new("/work/sites"), Tool::Dwm);
    /// assert_eq!(catalog.root(), Path::new("/work/sites/dwm.suckless.org/patches"));
    /// ```
    pub fn for_tool(catalog_repo: &Path, tool: Tool) -> Self {
        Self::at(catalog_repo.join(tool.patch_path()))
    }

    /// Replace the set of recognized diff extensions (without dots).
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// The patch root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every patch in the catalog, sorted by id.
    ///
    /// Directory names that are not valid patch ids are skipped with a
    /// warning, so they are missing from the total of an `all` run.
    pub fn list_patches(&self) -> Result<Vec<PatchEntry>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::MissingRoot {
                path: self.root.clone(),
            });
        }

        let entries = fs::read_dir(&self.root).map_err(|e| CatalogError::Io {
            path: self.root.clone(),
            source: e,
        })?;

        let mut patches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CatalogError::Io {
                path: self.root.clone(),
                source: e,
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match PatchId::new(name.as_str()) {
                Ok(id) => patches.push(PatchEntry { id, dir }),
                Err(e) => warn!(dir = %dir.display(), "skipping catalog directory: {e}"),
            }
        }

        patches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(patches)
    }

    /// Resolve a selection into catalog entries, in selection order.
    ///
    /// `All` yields every patch sorted by id. An explicit selection yields
    /// its ids in caller order.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingRoot`] if the patch root is missing
    /// - [`CatalogError::UnknownPatches`] naming every explicit id that has
    ///   no directory in the catalog
    pub fn resolve(&self, selection: &PatchSelection) -> Result<Vec<PatchEntry>, CatalogError> {
        let available = self.list_patches()?;
        let ids = match selection {
            PatchSelection::All => return Ok(available),
            PatchSelection::Explicit(ids) => ids,
        };

        let mut resolved = Vec::with_capacity(ids.len());
        let mut unknown = Vec::new();
        for id in ids {
            match available.iter().find(|entry| &entry.id == id) {
                Some(entry) => resolved.push(entry.clone()),
                None => unknown.push(id.to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(CatalogError::UnknownPatches {
                patches: unknown,
                root: self.root.clone(),
            });
        }
        Ok(resolved)
    }

    /// Diff variants of a patch, recursively, sorted by path.
    ///
    /// Entries that cannot be read are skipped with a warning; the patch is
    /// then judged on the variants that could be read.
    pub fn variants(&self, patch: &PatchEntry) -> Vec<DiffVariant> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&patch.dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(patch = %patch.id, "skipping unreadable catalog entry: {e}");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.is_recognized(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        paths
            .into_iter()
            .map(|path| DiffVariant::new(patch.id.clone(), path))
            .collect()
    }

    fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }
}
