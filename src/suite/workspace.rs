//! Workspace preparation
//!
//! Runs once, synchronously, before any simulation is dispatched: later
//! executions assume a clean output directory.

use std::fs;

use super::discovery::TestCase;
use super::error::SuiteResult;

/// Prepare the workspace of every case: create the `in`, `ref` and `out`
/// subdirectories next to the definition file if absent, and remove regular
/// files directly inside `out`. Subdirectories of `out` (which should not be
/// present anyway) and the `in` and `ref` trees are left untouched.
///
/// Idempotent: running it twice leaves the filesystem as after one run.
pub fn prepare(cases: &[TestCase]) -> SuiteResult<()> {
    for case in cases {
        fs::create_dir_all(case.input_dir())?;
        fs::create_dir_all(case.reference_dir())?;
        fs::create_dir_all(case.output_dir())?;

        for entry in fs::read_dir(case.output_dir())? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}
