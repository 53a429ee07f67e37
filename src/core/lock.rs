//! core::lock
//!
//! Exclusive lock on a tool checkout for the duration of a run.
//!
//! # Architecture
//!
//! Trials reset and clean the checkout after every apply, which is only
//! correct if nothing else touches the tree meanwhile. Within one process
//! the `&mut Workspace` borrow guarantees that; across processes this lock
//! does. Two `patchcheck check` runs against the same checkout cannot
//! overlap; runs against different checkouts are independent.
//!
//! # Storage
//!
//! - `<checkout>/.git/patchcheck.lock` - lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is held for the entire run
//! - Lock is released on drop (RAII pattern)
//! - Acquisition is non-blocking (fails fast if locked)

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("checkout is locked by another patchcheck run: {0}")]
    AlreadyLocked(PathBuf),

    /// Failed to create the lock file.
    #[error("failed to create lock {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock {path}: {source}")]
    AcquireFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An exclusive lock on a checkout.
///
/// Released automatically when dropped.
#[derive(Debug)]
pub struct CheckoutLock {
    path: PathBuf,
    file: Option<File>,
}

impl CheckoutLock {
    /// Acquire the lock for the checkout at `checkout`.
    ///
    /// The checkout's `.git` directory must already exist.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another run holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be taken
    pub fn acquire(checkout: &Path) -> Result<Self, LockError> {
        let path = paths::lock_path(checkout);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateFailed {
                path: path.clone(),
                source: e,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(LockError::AlreadyLocked(path))
            }
            Err(e) => Err(LockError::AcquireFailed { path, source: e }),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CheckoutLock {
    fn drop(&mut self) {
        // Best-effort release on drop
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}
