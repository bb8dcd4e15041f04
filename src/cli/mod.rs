//! CLI module for helios-suite
//!
//! This module provides the command-line interface for the suite runner.
//!
//! ## Commands
//!
//! - `test [SELECTOR]` - Run functional test cases against the simulator
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::version::SUITE_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Functional test suite runner for the Helios simulation code
#[derive(Parser, Debug)]
#[command(name = "helios-suite")]
#[command(version = SUITE_VERSION)]
#[command(about = "Functional test suite runner for the Helios simulation code", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run functional test cases against the simulator
    Test {
        /// Case selection: ".", a sub-suite/case name, or "parent/name"
        #[arg(value_name = "SELECTOR", default_value = ".")]
        selector: String,
        /// Suite root directory
        #[arg(short = 's', long = "suite", value_name = "DIR", default_value = ".")]
        suite: PathBuf,
        /// Path to the simulator executable
        #[arg(long, value_name = "PATH", default_value = "helios")]
        simulator: PathBuf,
        /// Override the detected parallel capacity
        #[arg(short = 'j', long, value_name = "N")]
        capacity: Option<usize>,
        /// MPI processes per simulation
        #[arg(short = 'p', long, value_name = "N", default_value_t = 1)]
        processes: u32,
        /// Threads per simulation process
        #[arg(short = 't', long, value_name = "N", default_value_t = 1)]
        threads: u32,
        /// Let simulator console output through instead of silencing it
        #[arg(long)]
        visible: bool,
        /// Seconds to sleep between polling passes
        #[arg(long, value_name = "SECS", default_value_t = 1)]
        poll_interval: u64,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Test {
            selector,
            suite,
            simulator,
            capacity,
            processes,
            threads,
            visible,
            poll_interval,
        } => commands::run_suite(commands::TestArgs {
            selector,
            suite,
            simulator,
            capacity,
            processes,
            threads,
            visible,
            poll_interval,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
