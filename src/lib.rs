#![forbid(unsafe_code)]
//! Functional test suite runner for the Helios simulation code
//!
//! A Helios test suite is a directory tree in which every test case is a
//! directory holding exactly one `.sim` definition file plus `in`, `ref`
//! and `out` subdirectories. This crate discovers those cases, runs them
//! against the external `helios` executable with bounded parallelism, and
//! writes a consolidated plain-text report at the suite root.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and
//!   `suite` modules enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a runner bug (logic error), use
//!   `.expect("INVARIANT: reason")` with a clear explanation.

pub mod cli;
pub mod suite;
pub mod version;

pub use suite::config::{ConsoleMode, SuiteConfig};
pub use suite::discovery::TestCase;
pub use suite::engine::{EngineInfo, LaunchRequest, ProcessEngine, RunStatus, SimulationRun, SimulatorEngine};
pub use suite::error::{SuiteError, SuiteResult};
pub use suite::report::{AcceptFinished, Outcome, OutputVerifier, Verdict};
pub use suite::scheduler::{SuiteReport, TestSuite};
