//! Ensure the canonical mount point is backed by a live network mount.
//!
//! 1. A stale mount is force-unmounted first; failing that is fatal for the
//!    request.  No lazy unmount, no retry: the host re-runs the pipeline.
//! 2. If the path is not a mount point, create it (0755, with parents) and
//!    mount the share with the sorted option string.
//! 3. A live mount is left untouched, so a repeated request performs no
//!    mount or unmount at all.
//!
//! A concurrent invocation may mount the same path between our probe and our
//! mount call.  When the mount command fails but a re-probe shows a mount
//! point, the duplicate is tolerated.

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;

use tracing::{debug, info, warn};

use crate::error::FlexError;
use crate::paths::CanonicalMount;
use crate::probe::MountProbe;
use crate::tool::MountTool;

const MOUNT_POINT_MODE: u32 = 0o755;

/// What [`ensure_mounted`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// A live mount was already present.
    AlreadyMounted,
    /// The share was mounted by this invocation (or by a concurrent one).
    Mounted,
    /// A stale mount was unmounted and the share mounted again.
    Remounted,
}

pub fn ensure_mounted(
    probe: &dyn MountProbe,
    tool: &dyn MountTool,
    mount: &CanonicalMount,
) -> Result<MountOutcome, FlexError> {
    let path = mount.path();

    let repaired = if probe.is_stale(path) {
        warn!(path = %path.display(), "stale mount detected, unmounting");
        tool.unmount(path).map_err(|e| FlexError::StaleMount {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        true
    } else {
        false
    };

    if probe.is_mounted(path) {
        debug!(path = %path.display(), "already mounted, skipping mount");
        return Ok(MountOutcome::AlreadyMounted);
    }

    DirBuilder::new()
        .recursive(true)
        .mode(MOUNT_POINT_MODE)
        .create(path)
        .map_err(|e| FlexError::MountPointCreate {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    if let Err(e) = tool.mount(mount.share(), path, mount.options()) {
        if probe.is_mounted(path) {
            warn!(
                path = %path.display(),
                error = %e,
                "mount reported failure but path is mounted, assuming concurrent mount",
            );
        } else {
            return Err(e);
        }
    }

    info!(
        share = mount.share(),
        path = %path.display(),
        options = mount.options(),
        repaired,
        "network share mounted",
    );
    Ok(if repaired {
        MountOutcome::Remounted
    } else {
        MountOutcome::Mounted
    })
}
