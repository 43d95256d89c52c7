//! External mount / unmount utilities.
//!
//! The NFS protocol itself is left entirely to the kernel and the host's
//! `mount` binary.  On failure the combined stdout and stderr of the tool is
//! attached verbatim to the returned error.

use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use crate::config::DriverConfig;
use crate::error::FlexError;

/// Mutating operations on the node's mount table.
pub trait MountTool: Send + Sync {
    /// Mount `share` at `mount_point` with the (already sorted) option string.
    fn mount(&self, share: &str, mount_point: &Path, options: &str) -> Result<(), FlexError>;

    /// Unmount whatever is mounted at `mount_point`.
    fn unmount(&self, mount_point: &Path) -> Result<(), FlexError>;
}

/// [`MountTool`] that shells out to the host's `mount` and `umount`.
#[derive(Debug, Clone)]
pub struct HostTool {
    mount_bin: String,
    umount_bin: String,
    fs_type: String,
}

impl HostTool {
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            mount_bin: config.mount_bin.clone(),
            umount_bin: config.umount_bin.clone(),
            fs_type: config.fs_type.clone(),
        }
    }

    /// Arguments for `mount`; `-o` is left out when there are no options.
    fn mount_args(&self, share: &str, mount_point: &Path, options: &str) -> Vec<String> {
        let mut args = vec![
            "-t".to_owned(),
            self.fs_type.clone(),
            share.to_owned(),
            mount_point.to_string_lossy().into_owned(),
        ];
        if !options.is_empty() {
            args.push("-o".to_owned());
            args.push(options.to_owned());
        }
        args
    }
}

impl MountTool for HostTool {
    fn mount(&self, share: &str, mount_point: &Path, options: &str) -> Result<(), FlexError> {
        let mut cmd = Command::new(&self.mount_bin);
        cmd.args(self.mount_args(share, mount_point, options));
        run_tool(cmd).map_err(|reason| FlexError::MountFailed {
            path: mount_point.display().to_string(),
            reason,
        })
    }

    fn unmount(&self, mount_point: &Path) -> Result<(), FlexError> {
        let mut cmd = Command::new(&self.umount_bin);
        cmd.arg(mount_point);
        run_tool(cmd).map_err(|reason| FlexError::UnmountFailed {
            path: mount_point.display().to_string(),
            reason,
        })
    }
}

/// Run a tool to completion.  On failure returns `"<status>: <output>"`.
///
/// There is no deadline: a hung mount hangs the invocation.
pub fn run_tool(mut cmd: Command) -> Result<(), String> {
    debug!(?cmd, "running tool");
    let output = cmd
        .output()
        .map_err(|e| format!("failed to run {:?}: {e}", cmd.get_program()))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(format!("{}: {}", output.status, combined_output(&output)))
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
