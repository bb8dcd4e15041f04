//! helios-suite version information.
//!
//! This module exposes the tool version as a single constant so all subsystems
//! (CLI, report headers) agree on the same value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.
//! - Prefer this constant over repeating `env!("CARGO_PKG_VERSION")` in multiple places.

/// The helios-suite version string (for example, `0.3.1`).
pub const SUITE_VERSION: &str = env!("CARGO_PKG_VERSION");
