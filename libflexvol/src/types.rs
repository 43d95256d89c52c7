//! Core driver types: the per-request volume source and the response envelope.
//!
//! The host passes every volume option as a JSON string, so [`VolumeSource`]
//! keeps the raw values and exposes typed accessors that validate them on
//! demand.  [`DriverResponse`] is the single JSON object written back to the
//! host on stdout.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FlexError;

// ---------------------------------------------------------------------------
// Volume source
// ---------------------------------------------------------------------------

/// Immutable per-request volume configuration supplied by the host.
///
/// Unknown keys (for example the `kubernetes.io/*` entries the host injects)
/// are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSource {
    /// Remote export, e.g. `nfs.example.com:/export`.
    pub share: String,
    /// Comma-separated mount flags; order does not matter.
    #[serde(default)]
    pub mount_options: String,
    /// Optional relative directory inside the share to expose.
    #[serde(default)]
    pub sub_path: String,
    /// Create `sub_path` when it does not exist.
    #[serde(default, deserialize_with = "flag")]
    pub create_if_necessary: bool,
    /// Permission mode used when creating `sub_path`, e.g. `"0755"`.
    #[serde(default, deserialize_with = "scalar")]
    pub create_mode: Option<String>,
    /// Owner applied to a created `sub_path`.
    #[serde(default, deserialize_with = "scalar")]
    pub create_uid: Option<String>,
    /// Group applied to a created `sub_path`.
    #[serde(default, deserialize_with = "scalar")]
    pub create_gid: Option<String>,
}

impl VolumeSource {
    /// Decode the JSON options argument passed by the host.
    pub fn from_json(raw: &str) -> Result<Self, FlexError> {
        let source: Self = serde_json::from_str(raw)
            .map_err(|e| FlexError::InvalidArgument(format!("malformed volume options: {e}")))?;
        source.validate()?;
        Ok(source)
    }

    /// Check the fields that every request needs regardless of the
    /// pipeline stage.
    pub fn validate(&self) -> Result<(), FlexError> {
        if self.share.trim().is_empty() {
            return Err(FlexError::invalid("share must not be empty"));
        }
        Ok(())
    }

    /// Parse `create_mode` into permission bits.
    ///
    /// Accepts the same prefixes as the host tooling: `0x` (hex), `0o` or a
    /// bare leading `0` (octal), `0b` (binary), otherwise decimal.
    pub fn create_mode(&self) -> Result<u32, FlexError> {
        let raw = self
            .create_mode
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FlexError::invalid("createMode is required when createIfNecessary is true"))?;
        let mode = parse_mode(raw)
            .ok_or_else(|| FlexError::InvalidArgument(format!("invalid createMode {raw:?}")))?;
        if mode > 0o7777 {
            return Err(FlexError::InvalidArgument(format!(
                "createMode {raw:?} exceeds permission bits"
            )));
        }
        Ok(mode)
    }

    /// Parse the optional `createUid` / `createGid` pair.
    pub fn create_owner(&self) -> Result<(Option<u32>, Option<u32>), FlexError> {
        Ok((
            parse_id("createUid", self.create_uid.as_deref())?,
            parse_id("createGid", self.create_gid.as_deref())?,
        ))
    }
}

fn parse_mode(raw: &str) -> Option<u32> {
    let lower = raw.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

fn parse_id(field: &str, raw: Option<&str>) -> Result<Option<u32>, FlexError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<u32>()
            .map(Some)
            .map_err(|e| FlexError::InvalidArgument(format!("invalid {field} {s:?}: {e}"))),
    }
}

/// The host sends `"true"`; a real JSON boolean is accepted as well.
fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Str(String),
    }
    Ok(match Flag::deserialize(de)? {
        Flag::Bool(b) => b,
        Flag::Str(s) => s == "true",
    })
}

/// Keep numeric fields as strings so prefix handling stays in one place.
fn scalar<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Num(u64),
        Str(String),
    }
    Ok(Option::<Scalar>::deserialize(de)?.map(|v| match v {
        Scalar::Num(n) => n.to_string(),
        Scalar::Str(s) => s,
    }))
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Outcome reported to the host in the `status` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriverStatus {
    Success,
    Failure,
    #[serde(rename = "Not supported")]
    NotSupported,
}

/// Capabilities advertised by `init`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverCapabilities {
    /// `false`: the host calls mount/unmount directly, with no separate
    /// attach/detach phase.
    pub attach: bool,
}

/// The single JSON object written to stdout for every invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverResponse {
    pub status: DriverStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<DriverCapabilities>,
}

impl DriverResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: DriverStatus::Success,
            message: message.into(),
            capabilities: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: DriverStatus::Failure,
            message: message.into(),
            capabilities: None,
        }
    }

    pub fn not_supported(verb: &str) -> Self {
        Self {
            status: DriverStatus::NotSupported,
            message: format!("Operation {verb} is not supported"),
            capabilities: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: DriverCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

impl From<FlexError> for DriverResponse {
    fn from(err: FlexError) -> Self {
        Self::failure(err.to_string())
    }
}
