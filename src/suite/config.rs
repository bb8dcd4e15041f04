//! Run configuration
//!
//! One explicit configuration object per suite run, built by the CLI and
//! passed to each component at construction. Nothing here is process-global.

use std::path::PathBuf;
use std::time::Duration;

/// Where the simulator's console output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMode {
    /// Discard simulator stdout/stderr (the default; many runs share one terminal).
    #[default]
    Silent,
    /// Let the simulator write to the inherited console.
    Visible,
}

/// Configuration for one suite run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Top-level suite directory.
    pub suite_root: PathBuf,
    /// Path to the simulator executable.
    pub simulator: PathBuf,
    /// MPI process count passed to each simulation.
    pub processes: u32,
    /// Thread count passed to each simulation.
    pub threads: u32,
    /// Console handling for simulator output.
    pub console: ConsoleMode,
    /// Sleep interval between scheduler passes that finalized nothing.
    pub poll_interval: Duration,
    /// Override for the detected parallel capacity (slot count upper bound).
    pub capacity: Option<usize>,
}

impl SuiteConfig {
    /// Create a configuration with the conventional defaults: one process,
    /// one thread per simulation, silent console, one-second poll interval,
    /// capacity detected from the host.
    pub fn new(suite_root: impl Into<PathBuf>, simulator: impl Into<PathBuf>) -> Self {
        Self {
            suite_root: suite_root.into(),
            simulator: simulator.into(),
            processes: 1,
            threads: 1,
            console: ConsoleMode::Silent,
            poll_interval: Duration::from_secs(1),
            capacity: None,
        }
    }

    /// Parallel capacity for the slot pool: the configured override if any,
    /// otherwise the host's available parallelism, never less than one.
    pub fn effective_capacity(&self) -> usize {
        self.capacity
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(std::num::NonZeroUsize::get)
                    .unwrap_or(1)
            })
            .max(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_single_process_single_thread() {
        let config = SuiteConfig::new("/suite", "helios");
        assert_eq!(config.processes, 1);
        assert_eq!(config.threads, 1);
        assert_eq!(config.console, ConsoleMode::Silent);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn capacity_override_wins_and_is_clamped() {
        let mut config = SuiteConfig::new("/suite", "helios");
        config.capacity = Some(3);
        assert_eq!(config.effective_capacity(), 3);
        config.capacity = Some(0);
        assert_eq!(config.effective_capacity(), 1);
    }

    #[test]
    fn detected_capacity_is_at_least_one() {
        let config = SuiteConfig::new("/suite", "helios");
        assert!(config.effective_capacity() >= 1);
    }
}
