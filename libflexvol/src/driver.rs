//! FlexVolume driver service.
//!
//! The host calls three operations on each node:
//!
//! 1. **Init**: report capabilities (no attach/detach phase).
//! 2. **Mount**: ensure the shared NFS mount, the subPath and the symlink at
//!    the target.
//! 3. **Unmount**: remove the symlink at the target.  The shared NFS mount
//!    stays in place for other pods.
//!
//! Each mount request walks `PathDerived → MountEnsured → SubPathEnsured →
//! Published`; the first failing stage ends the request.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::config::DriverConfig;
use crate::error::FlexError;
use crate::lock::MountLock;
use crate::orchestrator::{self, MountOutcome};
use crate::paths::CanonicalMount;
use crate::probe::{HostProbe, MountProbe};
use crate::publish;
use crate::subpath::{self, SubPathPolicy};
use crate::tool::{HostTool, MountTool};
use crate::types::{DriverCapabilities, VolumeSource};

/// Driver service: the operations the host may invoke.
pub trait FlexVolumeDriver: Send + Sync {
    /// Report the driver's capabilities.
    fn init(&self) -> Result<DriverCapabilities, FlexError>;

    /// Publish `source` at `target`.
    ///
    /// This is idempotent: repeating it with identical arguments replaces the
    /// link and performs no second network mount.
    fn mount(&self, target: &Path, source: &VolumeSource) -> Result<MountReport, FlexError>;

    /// Remove the published entry at `target`.  A missing target is an error.
    fn unmount(&self, target: &Path) -> Result<(), FlexError>;
}

/// Details of a completed mount request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountReport {
    /// The canonical mount point backing the request.
    pub mount_point: PathBuf,
    /// Directory the target link points at.
    pub source_path: PathBuf,
    pub outcome: MountOutcome,
}

/// NFS-backed [`FlexVolumeDriver`].
pub struct NfsDriver {
    config: DriverConfig,
    probe: Box<dyn MountProbe>,
    tool: Box<dyn MountTool>,
}

impl NfsDriver {
    /// Create a driver that uses the host's mount utilities.
    pub fn new(config: DriverConfig) -> Self {
        let probe = Box::new(HostProbe::new(&config));
        let tool = Box::new(HostTool::new(&config));
        Self::with_backends(config, probe, tool)
    }

    /// Create a driver with explicit probe and tool implementations.
    pub fn with_backends(
        config: DriverConfig,
        probe: Box<dyn MountProbe>,
        tool: Box<dyn MountTool>,
    ) -> Self {
        Self {
            config,
            probe,
            tool,
        }
    }

    /// Canonical mount point for `source` under the configured root.
    pub fn canonical_mount(&self, source: &VolumeSource) -> CanonicalMount {
        CanonicalMount::derive(&self.config.mount_root, &source.share, &source.mount_options)
    }

    fn ensure_mounted(&self, mount: &CanonicalMount) -> Result<MountOutcome, FlexError> {
        let _lock = if self.config.lock_mounts {
            Some(MountLock::acquire(&mount.lock_path())?)
        } else {
            None
        };
        orchestrator::ensure_mounted(self.probe.as_ref(), self.tool.as_ref(), mount)
    }
}

/// Validate every request field before any side effect.
fn subpath_policy(source: &VolumeSource) -> Result<SubPathPolicy, FlexError> {
    if !source.create_if_necessary {
        return Ok(SubPathPolicy::MustExist);
    }
    let mode = source.create_mode()?;
    let (uid, gid) = source.create_owner()?;
    Ok(SubPathPolicy::Create { mode, uid, gid })
}

impl FlexVolumeDriver for NfsDriver {
    fn init(&self) -> Result<DriverCapabilities, FlexError> {
        Ok(DriverCapabilities { attach: false })
    }

    #[instrument(skip(self, target, source), fields(target = %target.display(), share = %source.share))]
    fn mount(&self, target: &Path, source: &VolumeSource) -> Result<MountReport, FlexError> {
        source.validate()?;
        let policy = subpath_policy(source)?;

        let mount = self.canonical_mount(source);
        let source_path = subpath::resolve(mount.path(), &source.sub_path)?;
        debug!(mount_point = %mount.path().display(), "canonical mount point derived");

        let outcome = self.ensure_mounted(&mount)?;
        subpath::ensure(&source_path, policy)?;
        publish::publish(&source_path, target)?;

        info!(
            mount_point = %mount.path().display(),
            source_path = %source_path.display(),
            ?outcome,
            "mount completed",
        );
        Ok(MountReport {
            mount_point: mount.path().to_path_buf(),
            source_path,
            outcome,
        })
    }

    #[instrument(skip(self, target), fields(target = %target.display()))]
    fn unmount(&self, target: &Path) -> Result<(), FlexError> {
        publish::unpublish(target)
    }
}
