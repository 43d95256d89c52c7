//! Optional advisory lock around the stale-repair / mount sequence.
//!
//! Without the lock, two invocations racing on the same canonical mount point
//! both rely on the mount utility rejecting the duplicate.  With
//! `lock_mounts` enabled the sequence is serialized per mount point with
//! `flock(2)`; the lock is released when the guard is dropped.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tracing::debug;

use crate::error::FlexError;

/// RAII exclusive lock on a lock file.
pub struct MountLock {
    _lock: Flock<File>,
    path: PathBuf,
}

impl MountLock {
    /// Block until the exclusive lock on `path` is held.
    ///
    /// Creates the lock file and its parent directories if missing.
    pub fn acquire(path: &Path) -> Result<Self, FlexError> {
        let lock_err = |reason: String| FlexError::Lock {
            path: path.display().to_string(),
            reason,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| lock_err(format!("create lock dir: {e}")))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| lock_err(e.to_string()))?;
        let lock = Flock::lock(file, FlockArg::LockExclusive)
            .map_err(|(_, errno)| lock_err(errno.to_string()))?;
        debug!(path = %path.display(), "mount lock acquired");
        Ok(Self {
            _lock: lock,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
