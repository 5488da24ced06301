//! Scoped change of the process working directory.
//!
//! The working directory is process-wide state. [`ScopedWorkingDir`] records
//! the current directory, switches, and switches back when dropped, whether
//! the scope ends normally, through `?`, or by unwinding. Guards serialise
//! on a process-wide lock so two traversals never interleave directory
//! changes.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

static WORKING_DIR_LOCK: Mutex<()> = Mutex::new(());

#[must_use = "the previous working directory is restored when the guard is dropped"]
pub struct ScopedWorkingDir {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedWorkingDir {
    /// Save the current directory and switch to `dir` if one is given.
    ///
    /// With `None` the directory is left alone but the lock is still held,
    /// so relative paths stay stable for the guard's lifetime.
    pub fn enter(dir: Option<&Path>) -> Result<Self> {
        // Poisoned only if a holder panicked, and its Drop restored the directory.
        let lock = WORKING_DIR_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let original = std::env::current_dir().map_err(Error::CurrentDirectory)?;

        if let Some(dir) = dir {
            std::env::set_current_dir(dir).map_err(|source| Error::WorkingDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
            tracing::debug!(dir = %dir.display(), "Switched working directory");
        }

        Ok(Self {
            original,
            _lock: lock,
        })
    }

    /// Directory that will be restored on drop.
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for ScopedWorkingDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            tracing::warn!(
                dir = %self.original.display(),
                error = %e,
                "Failed to restore working directory"
            );
        }
    }
}
