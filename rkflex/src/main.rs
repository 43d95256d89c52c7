//! `rkflex <verb> [args...]`
//!
//! Invoked by the kubelet volume plugin manager. Prints exactly one JSON
//! response on stdout and exits 0; the outcome lives in the `status` field.

mod config;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use libflexvol::{DriverCall, DriverConfig, DriverResponse, NfsDriver, dispatch};
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LOG_CONFIG;

#[derive(Parser, Debug)]
#[command(name = "rkflex", version, about = "NFS FlexVolume driver")]
struct Cli {
    /// Driver verb: init, mount, unmount, ...
    verb: String,

    /// Verb arguments, passed through untouched.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_new(&LOG_CONFIG.filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    let journald = if LOG_CONFIG.journald {
        tracing_journald::layer().ok()
    } else {
        None
    };
    let to_stderr = journald.is_none();
    let json = (to_stderr && LOG_CONFIG.json)
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let plain = (to_stderr && !LOG_CONFIG.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(std::io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(journald)
        .with(json)
        .with(plain)
        .try_init();
}

fn print_response(response: &DriverResponse) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, response).context("failed to encode driver response")?;
    writeln!(out).context("failed to write driver response")?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

fn run() -> DriverResponse {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => return DriverResponse::failure(format!("invalid arguments: {}", e.kind())),
    };

    let call = match DriverCall::from_args(&cli.verb, &cli.args) {
        Ok(call) => call,
        Err(response) => return response,
    };
    let driver = NfsDriver::new(DriverConfig::from_env());
    dispatch(&driver, call)
}

fn main() {
    init_tracing();
    let response = run();
    if let Err(e) = print_response(&response) {
        error!("{e:#}");
    }
}
