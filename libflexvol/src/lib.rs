//! # libflexvol: NFS FlexVolume driver core for RK8s
//!
//! `libflexvol` implements the node-side logic of an NFS [FlexVolume][flex]
//! driver.  The host volume-plugin manager invokes the driver once per
//! operation; every invocation runs the same synchronous pipeline:
//!
//! ```text
//! derive canonical mount point → repair / ensure NFS mount
//!     → ensure subPath → publish symlink at target → report
//! ```
//!
//! All requests for the same `(share, options)` pair converge on one shared
//! mount under the configured mount root.  Every stage re-checks its own
//! precondition, so the host can retry the whole pipeline at any time.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`paths`] | Canonical mount point derivation. |
//! | [`probe`] | [`MountProbe`]: staleness and mount-point checks. |
//! | [`tool`] | [`MountTool`]: external `mount` / `umount` invocations. |
//! | [`orchestrator`] | Stale repair and idempotent network mount. |
//! | [`lock`] | Optional advisory lock around the mount sequence. |
//! | [`subpath`] | SubPath validation, creation and verification. |
//! | [`publish`] | Symlink (re)creation at the caller's target. |
//! | [`driver`] | [`FlexVolumeDriver`] trait and the [`NfsDriver`] backend. |
//! | [`dispatch`] | Verb dispatch and [`DriverResponse`] reporting. |
//! | [`config`] | [`DriverConfig`]: mount root and tool configuration. |
//! | [`types`] | Request / response data model. |
//! | [`error`] | [`FlexError`] enum covering all failure modes. |
//!
//! [flex]: https://github.com/kubernetes/community/blob/master/contributors/devel/sig-storage/flexvolume.md

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod paths;
pub mod probe;
pub mod publish;
pub mod subpath;
pub mod tool;
pub mod types;

// Re-export the most commonly used items at crate root for convenience.
pub use config::DriverConfig;
pub use dispatch::{DriverCall, dispatch};
pub use driver::{FlexVolumeDriver, MountReport, NfsDriver};
pub use error::FlexError;
pub use orchestrator::MountOutcome;
pub use paths::CanonicalMount;
pub use probe::{HostProbe, MountProbe};
pub use tool::{HostTool, MountTool};
pub use types::*;
