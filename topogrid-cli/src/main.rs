//! `topogrid` binary.
//!
//! Reports go to stdout; diagnostics and the final failure record go to
//! stderr through `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use topogrid_cli::{
    cli::{Cli, CliError, render_report, run_cli},
    logging::{LoggingError, init_logging},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let report = run_cli(Cli::parse()).context("command failed")?;
    let mut out = BufWriter::new(io::stdout().lock());
    render_report(&report, &mut out).context("could not write the report")?;
    out.flush().context("could not flush stdout")
}

fn report_failure(err: &anyhow::Error) {
    let cli_error = err.downcast_ref::<CliError>();
    let code = cli_error
        .and_then(CliError::topology_code)
        .map(|code| field::display(code.as_str()));
    let format_code = cli_error
        .and_then(CliError::format_code)
        .map(|code| field::display(code.as_str()));
    error!(error = %format!("{err:#}"), code, format_code, "topogrid failed");
}

#[expect(
    clippy::print_stderr,
    reason = "no subscriber exists to carry this message"
)]
fn report_logging_failure(err: &LoggingError) {
    eprintln!("topogrid: logging setup failed: {err}");
}

fn main() -> ExitCode {
    if let Err(err) = init_logging() {
        report_logging_failure(&err);
        return ExitCode::FAILURE;
    }
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
