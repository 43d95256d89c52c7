//! SubPath resolution inside a mounted share.
//!
//! The resolved source is the mount point itself, or the mount point joined
//! with `subPath`.  A leading `/` is anchored at the mount point and `..`
//! segments are rejected, so a request can never reach outside the share.
//! This stage never touches the caller's target.

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Component, Path, PathBuf};

use nix::unistd::{Gid, Uid, chown};
use tracing::debug;

use crate::error::FlexError;

/// Join `sub_path` onto `mount_point`, refusing anything that escapes it.
pub fn resolve(mount_point: &Path, sub_path: &str) -> Result<PathBuf, FlexError> {
    let mut resolved = mount_point.to_path_buf();
    for component in Path::new(sub_path).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(FlexError::InvalidArgument(format!(
                    "subPath {sub_path:?} must not contain '..'"
                )));
            }
        }
    }
    Ok(resolved)
}

/// How [`ensure`] treats a missing source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPathPolicy {
    /// The directory must already exist.
    MustExist,
    /// Create the directory (and parents) with the given mode and owner.
    Create {
        mode: u32,
        uid: Option<u32>,
        gid: Option<u32>,
    },
}

/// Establish or verify the backing directory at `source`.
pub fn ensure(source: &Path, policy: SubPathPolicy) -> Result<(), FlexError> {
    match policy {
        SubPathPolicy::MustExist => {
            std::fs::metadata(source).map_err(|e| FlexError::SubPathMissing {
                path: source.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        SubPathPolicy::Create { mode, uid, gid } => {
            let create_err = |reason: String| FlexError::SubPathCreate {
                path: source.display().to_string(),
                reason,
            };
            DirBuilder::new()
                .recursive(true)
                .mode(mode)
                .create(source)
                .map_err(|e| create_err(e.to_string()))?;
            if uid.is_some() || gid.is_some() {
                chown(source, uid.map(Uid::from_raw), gid.map(Gid::from_raw))
                    .map_err(|e| create_err(format!("chown: {e}")))?;
            }
            debug!(path = %source.display(), mode = %format_args!("{mode:o}"), "subPath ensured");
        }
    }
    Ok(())
}
