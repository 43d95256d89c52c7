//! Map a host invocation to a driver call and report the outcome.
//!
//! The host reads the outcome only from the JSON payload, never from the
//! exit code, so every path through [`dispatch`] yields a [`DriverResponse`].

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::driver::FlexVolumeDriver;
use crate::types::{DriverResponse, DriverStatus, VolumeSource};

/// One host invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// `init`
    Init,
    /// `mount <target> <json options>`; `options` is still raw JSON.
    Mount { target: PathBuf, options: String },
    /// `unmount <target>`
    Unmount { target: PathBuf },
    /// Any verb this driver does not implement.
    Unsupported(String),
}

impl DriverCall {
    /// Build a call from the verb and its positional arguments.
    ///
    /// For `mount` the first argument is the target and the last is the JSON
    /// options, so both the `mount <dir> <json>` and the older
    /// `mount <dir> <device> <json>` forms are accepted.
    pub fn from_args(verb: &str, args: &[String]) -> Result<Self, DriverResponse> {
        match verb {
            "init" => Ok(Self::Init),
            "mount" => match args {
                [target, .., options] => Ok(Self::Mount {
                    target: PathBuf::from(target),
                    options: options.clone(),
                }),
                _ => Err(DriverResponse::failure(
                    "mount requires a target path and JSON options",
                )),
            },
            "unmount" => match args.first() {
                Some(target) => Ok(Self::Unmount {
                    target: PathBuf::from(target),
                }),
                None => Err(DriverResponse::failure("unmount requires a target path")),
            },
            other => Ok(Self::Unsupported(other.to_owned())),
        }
    }
}

/// Run `call` against `driver` and fold the result into a response.
pub fn dispatch<T: FlexVolumeDriver + ?Sized>(driver: &T, call: DriverCall) -> DriverResponse {
    debug!(?call, "driver call received");
    let response = match call {
        DriverCall::Init => match driver.init() {
            Ok(caps) => {
                DriverResponse::success("No Initialization required").with_capabilities(caps)
            }
            Err(e) => e.into(),
        },
        DriverCall::Mount { target, options } => {
            match VolumeSource::from_json(&options).and_then(|src| driver.mount(&target, &src)) {
                Ok(_) => DriverResponse::success("Mount completed!"),
                Err(e) => e.into(),
            }
        }
        DriverCall::Unmount { target } => match driver.unmount(&target) {
            Ok(()) => DriverResponse::success("Successfully unmounted"),
            Err(e) => e.into(),
        },
        DriverCall::Unsupported(verb) => DriverResponse::not_supported(&verb),
    };
    if response.status != DriverStatus::Success {
        warn!(status = ?response.status, message = %response.message, "driver call did not succeed");
    }
    response
}
