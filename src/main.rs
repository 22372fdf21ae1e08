//! Application entry point.
//!
//! Parses command-line arguments, merges layered configuration and delegates
//! execution to [`runner::run`]. Fatal errors are rendered on stderr and
//! mapped to their exit status.

use clap::error::ErrorKind;
use std::io::{self, Write};
use std::process::ExitCode;
use stepcheck::exit_status::ExitStatus;
use stepcheck::{cli, runner};
use tracing::Level;
use tracing_subscriber::fmt;

fn init_tracing(verbose: bool) {
    let max_level = if verbose { Level::DEBUG } else { Level::ERROR };
    fmt()
        .with_writer(io::stderr)
        .with_max_level(max_level)
        .init();
}

/// Print a clap error (or help/version output) and choose the status.
fn clap_exit(err: &clap::Error) -> ExitCode {
    drop(err.print());
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Success.into(),
        _ => ExitStatus::InvalidConfiguration.into(),
    }
}

fn main() -> ExitCode {
    let (parsed, matches) = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => return clap_exit(&err),
    };
    init_tracing(parsed.verbose);
    let merged = match cli::merge_with_config(&parsed, &matches) {
        Ok(merged) => merged,
        Err(err) => {
            tracing::error!(error = %err, "configuration merge failed");
            drop(writeln!(io::stderr(), "stepcheck: {err}"));
            return ExitStatus::InvalidConfiguration.into();
        }
    };
    match runner::run(&merged) {
        Ok(status) => status.into(),
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            let status = err.exit_status();
            drop(writeln!(io::stderr(), "{:?}", miette::Report::new(err)));
            status.into()
        }
    }
}
