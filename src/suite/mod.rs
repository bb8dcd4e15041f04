//! Functional test suite runner
//!
//! A suite is a directory tree; each test case is a directory holding exactly
//! one `.sim` definition file plus `in`, `ref` and `out` subdirectories.
//! Running a suite goes through four stages:
//!
//! 1. `discovery` - resolve a selector to a sorted, deduplicated case list
//! 2. `workspace` - create missing case subdirectories, clear stale output
//! 3. `scheduler` - dispatch cases to a bounded slot pool and poll for
//!    completion (the core loop)
//! 4. `report` - classify each finished run and write the consolidated report
//!
//! The simulator itself is an external executable, reached only through the
//! `engine` traits, so everything above the process boundary is testable with
//! a scripted fake.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod workspace;
