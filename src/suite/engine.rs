//! Simulator invocation seam
//!
//! The runner never talks to the external simulator directly; it goes
//! through the [`SimulatorEngine`] / [`SimulationRun`] traits. This keeps
//! the scheduler testable with a scripted fake and leaves room for other
//! execution strategies (remote hosts, batch queues).
//!
//! [`ProcessEngine`] is the production implementation: it spawns the
//! simulator executable as a child process and polls it non-blockingly.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::config::{ConsoleMode, SuiteConfig};
use super::discovery::TestCase;
use super::error::{SuiteError, SuiteResult};

/// Terminal and non-terminal states of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The external process is still executing.
    Running,
    /// The process reached its normal terminal state.
    Finished,
    /// The process terminated without finishing (non-zero exit or signal).
    Aborted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "Running",
            RunStatus::Finished => "Finished",
            RunStatus::Aborted => "Aborted",
        };
        write!(f, "{}", s)
    }
}

/// Identity of the simulator behind an engine, for report headers.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    /// Version line reported by the simulator itself.
    pub version: String,
    /// Path of the executable being used.
    pub path: PathBuf,
}

/// Everything needed to launch one simulation.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Path of the `.sim` definition file.
    pub definition: PathBuf,
    /// Input directory for the simulation.
    pub input_dir: PathBuf,
    /// Output directory for the simulation.
    pub output_dir: PathBuf,
    /// MPI process count.
    pub processes: u32,
    /// Threads per process.
    pub threads: u32,
    /// Console handling for the child.
    pub console: ConsoleMode,
}

impl LaunchRequest {
    /// Build the launch request for a test case: the case's own `in` and
    /// `out` directories, sized per the run configuration.
    pub fn for_case(case: &TestCase, config: &SuiteConfig) -> Self {
        Self {
            definition: case.definition_file().to_path_buf(),
            input_dir: case.input_dir(),
            output_dir: case.output_dir(),
            processes: config.processes,
            threads: config.threads,
            console: config.console,
        }
    }
}

/// A launcher for simulations, bound to one simulator installation.
pub trait SimulatorEngine {
    type Run: SimulationRun;

    /// Identify the simulator (version line and executable path). Failure
    /// means the executable is missing or unlaunchable, which is fatal for
    /// the whole run.
    fn describe(&self) -> SuiteResult<EngineInfo>;

    /// Start a simulation without blocking. Returns a pollable handle.
    fn launch(&self, request: &LaunchRequest) -> SuiteResult<Self::Run>;
}

/// A handle on one (possibly still executing) simulation.
pub trait SimulationRun {
    /// Non-blocking liveness check.
    fn is_running(&mut self) -> bool;

    /// Current status; stable once terminal.
    fn status(&mut self) -> RunStatus;

    /// Definition file this run was launched from.
    fn definition_file(&self) -> &Path;

    /// Output directory this run writes into.
    fn output_dir(&self) -> &Path;
}

/// Launches the simulator as a child process.
///
/// Invocation: `helios <definition> -i <indir> -o <outdir> -p <N> -t <N>`,
/// with child output discarded in [`ConsoleMode::Silent`]. Exit success maps
/// to [`RunStatus::Finished`]; any other exit to [`RunStatus::Aborted`].
pub struct ProcessEngine {
    executable: PathBuf,
}

impl ProcessEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl SimulatorEngine for ProcessEngine {
    type Run = ProcessRun;

    fn describe(&self) -> SuiteResult<EngineInfo> {
        let output = Command::new(&self.executable)
            .arg("-v")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                SuiteError::ExecutionStart(format!(
                    "cannot run simulator '{}': {}",
                    self.executable.display(),
                    e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("Helios (unknown version)")
            .to_string();

        Ok(EngineInfo {
            version,
            path: self.executable.clone(),
        })
    }

    fn launch(&self, request: &LaunchRequest) -> SuiteResult<ProcessRun> {
        let mut command = Command::new(&self.executable);
        command
            .arg(&request.definition)
            .arg("-i")
            .arg(&request.input_dir)
            .arg("-o")
            .arg(&request.output_dir)
            .arg("-p")
            .arg(request.processes.to_string())
            .arg("-t")
            .arg(request.threads.to_string())
            .stdin(Stdio::null());

        if request.console == ConsoleMode::Silent {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = command.spawn().map_err(|e| {
            SuiteError::ExecutionStart(format!(
                "cannot launch simulator '{}' for '{}': {}",
                self.executable.display(),
                request.definition.display(),
                e
            ))
        })?;

        Ok(ProcessRun {
            child,
            status: RunStatus::Running,
            definition: request.definition.clone(),
            output_dir: request.output_dir.clone(),
        })
    }
}

/// Child-process handle for one simulation.
#[derive(Debug)]
pub struct ProcessRun {
    child: Child,
    status: RunStatus,
    definition: PathBuf,
    output_dir: PathBuf,
}

impl ProcessRun {
    /// Refresh the cached status via a non-blocking wait. The status is
    /// sticky once terminal.
    fn poll(&mut self) -> RunStatus {
        if self.status == RunStatus::Running {
            match self.child.try_wait() {
                Ok(Some(exit)) => {
                    self.status = if exit.success() {
                        RunStatus::Finished
                    } else {
                        RunStatus::Aborted
                    };
                }
                Ok(None) => {}
                // the handle is unusable; treat the run as gone
                Err(_) => self.status = RunStatus::Aborted,
            }
        }
        self.status
    }
}

impl SimulationRun for ProcessRun {
    fn is_running(&mut self) -> bool {
        self.poll() == RunStatus::Running
    }

    fn status(&mut self) -> RunStatus {
        self.poll()
    }

    fn definition_file(&self) -> &Path {
        &self.definition
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
