//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::PathBuf;
use std::time::Duration;

use crate::suite::config::{ConsoleMode, SuiteConfig};
use crate::suite::engine::ProcessEngine;
use crate::suite::error::SuiteError;
use crate::suite::report::AcceptFinished;
use crate::suite::scheduler::TestSuite;

use super::{CliError, CliResult, ExitCode};

/// Arguments of the `test` subcommand, decoupled from the clap surface.
pub struct TestArgs {
    pub selector: String,
    pub suite: PathBuf,
    pub simulator: PathBuf,
    pub capacity: Option<usize>,
    pub processes: u32,
    pub threads: u32,
    pub visible: bool,
    pub poll_interval: u64,
}

/// Run the functional test suite.
///
/// Exits with success only when every case succeeded, so CI jobs can gate
/// on the exit code; per-case details are in the consolidated report.
pub fn run_suite(args: TestArgs) -> CliResult<ExitCode> {
    let mut config = SuiteConfig::new(args.suite, args.simulator);
    config.processes = args.processes;
    config.threads = args.threads;
    config.capacity = args.capacity;
    config.poll_interval = Duration::from_secs(args.poll_interval);
    config.console = if args.visible {
        ConsoleMode::Visible
    } else {
        ConsoleMode::Silent
    };

    let suite = TestSuite::discover(&config.suite_root, &args.selector).map_err(to_cli_error)?;
    let engine = ProcessEngine::new(&config.simulator);

    let report = suite
        .perform(&engine, &config, &AcceptFinished)
        .map_err(to_cli_error)?;

    println!("Test report written to {}", report.report_path.display());
    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn to_cli_error(err: SuiteError) -> CliError {
    CliError::failure(format!("Error: {}", err))
}
