//! Suite runner error taxonomy
//!
//! Only failures that abort the whole run are errors. A test case that
//! crashes or produces wrong output is an [`Outcome`](crate::suite::report::Outcome),
//! recorded in the statistics; it never aborts the suite.

use thiserror::Error;

/// Errors that abort a suite run
#[derive(Debug, Error)]
pub enum SuiteError {
    /// User-facing configuration problem: empty case selection, bad selector
    /// syntax, missing suite directory.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external simulator is missing or cannot be launched.
    #[error("failed to start simulation: {0}")]
    ExecutionStart(String),

    /// Filesystem failure while preparing workspaces or writing reports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for suite operations.
pub type SuiteResult<T> = Result<T, SuiteError>;
