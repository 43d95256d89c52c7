//! Canonical mount point derivation.
//!
//! Every request with the same share and the same *set* of mount options maps
//! to one directory:
//!
//! ```text
//! <mount_root>/<share>/options/<sorted,options>
//! ```
//!
//! The share is used verbatim; callers must supply path-safe identifiers.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Sort a comma-separated option string so that permutations compare equal.
pub fn sorted_options(raw: &str) -> String {
    let mut opts: Vec<&str> = raw.split(',').collect();
    opts.sort_unstable();
    opts.join(",")
}

/// The shared, deterministic mount location for a `(share, options)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMount {
    share: String,
    options: String,
    path: PathBuf,
}

impl CanonicalMount {
    /// Derive the canonical mount point under `root`.
    pub fn derive(root: &Path, share: &str, mount_options: &str) -> Self {
        let options = sorted_options(mount_options);
        let root = root.to_string_lossy();
        let path = PathBuf::from(format!(
            "{}/{share}/options/{options}",
            root.trim_end_matches('/')
        ));
        Self {
            share: share.to_owned(),
            options,
            path,
        }
    }

    pub fn share(&self) -> &str {
        &self.share
    }

    /// Sorted option string handed to the mount utility.
    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used by the advisory mount lock.  It lives next to the
    /// mount point so a mounted share never shadows it.
    ///
    /// With empty options the mount point ends in `options/`, so the lock
    /// becomes `<share>/options.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }
}
