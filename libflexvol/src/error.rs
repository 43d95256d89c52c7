//! Driver error types.
//!
//! All errors in the `libflexvol` crate are represented by the [`FlexError`]
//! enum.  Every variant carries the path or command involved so the message
//! reported back to the host is enough for an operator to diagnose the
//! failure without access to the node's logs.

use thiserror::Error;

/// Unified error type for driver operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlexError {
    /// The caller supplied a malformed request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stale mount was detected but could not be unmounted.
    #[error("could not unmount stale mount {path}: {reason}")]
    StaleMount {
        /// Canonical mount point.
        path: String,
        /// Tool output or OS error.
        reason: String,
    },

    /// The canonical mount point directory could not be created.
    #[error("could not make mount path {path}: {reason}")]
    MountPointCreate {
        /// Directory that failed to be created.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// A mount operation failed.
    #[error("mount failed at {path}: {reason}")]
    MountFailed {
        /// Filesystem path where the mount was attempted.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// An unmount operation failed.
    #[error("unmount failed at {path}: {reason}")]
    UnmountFailed {
        /// Filesystem path where the unmount was attempted.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The requested subPath could not be created.
    #[error("could not create subPath {path}: {reason}")]
    SubPathCreate {
        /// Resolved source path.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The requested subPath does not exist and creation was not requested.
    #[error("could not find path {path} to be mounted: {reason}")]
    SubPathMissing {
        /// Resolved source path.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// An existing entry at the target could not be removed.
    #[error("could not remove target {path} before symlink: {reason}")]
    TargetRemove {
        /// Caller-owned target path.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The symlink at the target could not be created.
    #[error("could not symlink {source_path} to {target}: {reason}")]
    Symlink {
        /// Resolved source path the link points at.
        source_path: String,
        /// Caller-owned target path.
        target: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The advisory mount lock could not be acquired.
    #[error("could not lock {path}: {reason}")]
    Lock {
        /// Lock file path.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl FlexError {
    /// Create a [`FlexError::InvalidArgument`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn invalid<E: std::fmt::Display>(e: E) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}
