//! rkflex logging configuration.
//!
//! stdout carries the single JSON response the host parses, so diagnostics
//! only ever go to stderr or journald.
//!
//! Environment variables:
//! - `RKFLEX_LOG`: `EnvFilter` directives. Defaults to `warn`.
//! - `RKFLEX_LOG_FORMAT`: set to `json` for JSON lines on stderr.
//! - `RKFLEX_LOG_JOURNALD`: set to `1` to send logs to journald instead of stderr.

use std::sync::LazyLock;

pub struct LogConfig {
    pub filter: String,
    pub json: bool,
    pub journald: bool,
}

/// Globally initialized logging configuration, read from the environment at first access.
pub static LOG_CONFIG: LazyLock<LogConfig> = LazyLock::new(|| LogConfig {
    filter: std::env::var("RKFLEX_LOG")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "warn".to_owned()),
    json: std::env::var("RKFLEX_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false),
    journald: std::env::var("RKFLEX_LOG_JOURNALD")
        .map(|v| v == "1")
        .unwrap_or(false),
});
