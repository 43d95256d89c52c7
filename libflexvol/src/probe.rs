//! Mount point detection.
//!
//! Two independent checks feed the orchestrator:
//!
//! * **staleness**: `stat(2)` on the path returns `ESTALE` when the NFS
//!   server has evicted this client's mount.  Any other error, including
//!   `ENOENT`, is *not* staleness.
//! * **is-mounted**: the `mountpoint` utility exits zero for an active mount
//!   point.  Every other outcome (non-zero exit, tool missing, permission
//!   denied) reads as "not mounted", which at worst costs a redundant mount
//!   attempt.

use std::path::Path;
use std::process::{Command, Stdio};

use nix::errno::Errno;
use tracing::debug;

use crate::config::DriverConfig;

/// Read-only queries about the state of a mount point.
pub trait MountProbe: Send + Sync {
    /// `true` when the path is a mount whose remote backing is unreachable.
    fn is_stale(&self, path: &Path) -> bool;

    /// `true` when the path is currently an active mount point.
    fn is_mounted(&self, path: &Path) -> bool;
}

/// [`MountProbe`] backed by the host kernel and the `mountpoint` utility.
#[derive(Debug, Clone)]
pub struct HostProbe {
    mountpoint_bin: String,
}

impl HostProbe {
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            mountpoint_bin: config.mountpoint_bin.clone(),
        }
    }
}

impl MountProbe for HostProbe {
    fn is_stale(&self, path: &Path) -> bool {
        match nix::sys::stat::stat(path) {
            Err(Errno::ESTALE) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "stat failed, not treated as stale");
                false
            }
            Ok(_) => false,
        }
    }

    fn is_mounted(&self, path: &Path) -> bool {
        match Command::new(&self.mountpoint_bin)
            .arg("-q")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => status.success(),
            Err(e) => {
                debug!(
                    tool = %self.mountpoint_bin,
                    path = %path.display(),
                    error = %e,
                    "mountpoint check could not run, assuming not mounted",
                );
                false
            }
        }
    }
}
