//! Publish the resolved source at the caller's target via a symlink.
//!
//! `publish` removes whatever a previous (possibly crashed) invocation left at
//! the target and links it again, which makes a repeated mount request
//! succeed with an identical link.  Removal is never recursive: a symlink or
//! file is unlinked, an empty directory (the host pre-creates one) is
//! removed, anything else is an error.
//!
//! The window between remove and create is not atomic; a crash there leaves
//! the target absent until the next successful request.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::error::FlexError;

/// Remove the single entry at `target`.  `NotFound` is reported to the caller
/// as an `io::Error` so each operation can decide whether it is fatal.
fn remove_entry(target: &Path) -> std::io::Result<()> {
    let meta = std::fs::symlink_metadata(target)?;
    if meta.is_dir() {
        std::fs::remove_dir(target)
    } else {
        std::fs::remove_file(target)
    }
}

/// Replace the entry at `target` with a symlink pointing at `source`.
pub fn publish(source: &Path, target: &Path) -> Result<(), FlexError> {
    match remove_entry(target) {
        Ok(()) => debug!(target = %target.display(), "removed existing target"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(FlexError::TargetRemove {
                path: target.display().to_string(),
                reason: e.to_string(),
            });
        }
    }

    std::os::unix::fs::symlink(source, target).map_err(|e| FlexError::Symlink {
        source_path: source.display().to_string(),
        target: target.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(source = %source.display(), target = %target.display(), "target published");
    Ok(())
}

/// Remove the published entry at `target`.
///
/// Unlike [`publish`], a missing target is an error here.
pub fn unpublish(target: &Path) -> Result<(), FlexError> {
    remove_entry(target).map_err(|e| FlexError::UnmountFailed {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    info!(target = %target.display(), "target unpublished");
    Ok(())
}
