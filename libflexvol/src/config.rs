//! Driver configuration.
//!
//! The mount root and the external tools are injected through
//! [`DriverConfig`] rather than hardcoded, so tests can point the driver at a
//! temporary directory and fake binaries.
//!
//! Environment variables:
//! - `RKFLEX_MOUNT_ROOT`: root under which canonical mount points live.
//!   Defaults to `/mnt/nfsflexvolume`.
//! - `RKFLEX_FS_TYPE`: filesystem type passed to `mount -t`. Defaults to `nfs4`.
//! - `RKFLEX_MOUNT_BIN`, `RKFLEX_UMOUNT_BIN`, `RKFLEX_MOUNTPOINT_BIN`: tool
//!   overrides. Default to `mount`, `umount` and `mountpoint`.
//! - `RKFLEX_MOUNT_LOCK`: set to `1` to serialize the mount sequence for a
//!   canonical mount point with an advisory file lock. Defaults to `0`.

use std::path::PathBuf;

pub const DEFAULT_MOUNT_ROOT: &str = "/mnt/nfsflexvolume";
pub const DEFAULT_FS_TYPE: &str = "nfs4";

/// Node-local configuration shared by every driver operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Root namespace for canonical mount points; assumed to exist and be
    /// writable.
    pub mount_root: PathBuf,
    /// Filesystem type handed to the mount utility.
    pub fs_type: String,
    pub mount_bin: String,
    pub umount_bin: String,
    pub mountpoint_bin: String,
    /// Take an advisory lock keyed by the canonical mount point around the
    /// unmount/mount sequence.
    pub lock_mounts: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            fs_type: DEFAULT_FS_TYPE.to_owned(),
            mount_bin: "mount".to_owned(),
            umount_bin: "umount".to_owned(),
            mountpoint_bin: "mountpoint".to_owned(),
            lock_mounts: false,
        }
    }
}

impl DriverConfig {
    /// Build a configuration rooted at `mount_root` with default tools.
    pub fn with_root(mount_root: impl Into<PathBuf>) -> Self {
        Self {
            mount_root: mount_root.into(),
            ..Self::default()
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            mount_root: get("RKFLEX_MOUNT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.mount_root),
            fs_type: get("RKFLEX_FS_TYPE").unwrap_or(defaults.fs_type),
            mount_bin: get("RKFLEX_MOUNT_BIN").unwrap_or(defaults.mount_bin),
            umount_bin: get("RKFLEX_UMOUNT_BIN").unwrap_or(defaults.umount_bin),
            mountpoint_bin: get("RKFLEX_MOUNTPOINT_BIN").unwrap_or(defaults.mountpoint_bin),
            lock_mounts: get("RKFLEX_MOUNT_LOCK").is_some_and(|v| v == "1"),
        }
    }
}
