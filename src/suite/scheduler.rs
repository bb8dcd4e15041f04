//! Bounded-parallelism scheduler - the core of the suite runner
//!
//! A single controlling thread drives the loop; the actual concurrency is
//! between external simulator processes. Each pass of the loop:
//!
//! 1. dispatches pending cases (FIFO over discovery order) to every idle
//!    execution slot,
//! 2. finalizes at most one terminal run - classification, per-case report,
//!    statistics, one log line - so that a burst of simultaneous completions
//!    never starves re-dispatch,
//! 3. checks for termination (finalized count equals discovered count).
//!
//! When a pass finalizes nothing, the caller sleeps for the configured poll
//! interval before the next pass. Simulations run for minutes, so coarse
//! polling is adequate.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::thread;

use tracing::info;

use super::config::SuiteConfig;
use super::discovery::{self, TestCase};
use super::engine::{LaunchRequest, SimulationRun, SimulatorEngine};
use super::error::SuiteResult;
use super::report::{self, Outcome, OutputVerifier};
use super::workspace;

/// Fixed-size pool of execution slots; each slot runs at most one case.
///
/// A slot is released only after its run's result has been consumed, so the
/// busy count is exactly the number of in-flight simulations.
struct SlotPool {
    busy: Vec<bool>,
}

impl SlotPool {
    fn new(size: usize) -> Self {
        Self {
            busy: vec![false; size],
        }
    }

    fn len(&self) -> usize {
        self.busy.len()
    }

    fn busy_count(&self) -> usize {
        self.busy.iter().filter(|b| **b).count()
    }

    /// Claim the first idle slot, if any.
    fn acquire(&mut self) -> Option<usize> {
        let idx = self.busy.iter().position(|b| !*b)?;
        self.busy[idx] = true;
        Some(idx)
    }

    fn release(&mut self, idx: usize) {
        self.busy[idx] = false;
    }
}

/// A dispatched case together with its slot and live run handle.
struct InFlight<R> {
    slot: usize,
    case: TestCase,
    run: R,
}

/// What one scheduler pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerPass {
    /// Cases dispatched to slots during this pass.
    pub dispatched: usize,
    /// Whether a run was finalized this pass (at most one ever is).
    pub finalized: bool,
}

/// Mutable run state of one suite execution: pending queue, slot pool,
/// in-flight bindings and outcome statistics. Driven pass by pass via
/// [`Scheduler::step`]; only [`TestSuite::perform`] adds the sleep between
/// passes.
pub struct Scheduler<R> {
    suite_root: PathBuf,
    config: SuiteConfig,
    pending: VecDeque<TestCase>,
    slots: SlotPool,
    in_flight: Vec<InFlight<R>>,
    statistics: BTreeMap<Outcome, usize>,
    total: usize,
    done: usize,
}

impl<R: SimulationRun> Scheduler<R> {
    pub fn new(cases: &[TestCase], slot_count: usize, suite_root: &Path, config: &SuiteConfig) -> Self {
        Self {
            suite_root: suite_root.to_path_buf(),
            config: config.clone(),
            pending: cases.iter().cloned().collect(),
            slots: SlotPool::new(slot_count),
            in_flight: Vec::new(),
            statistics: BTreeMap::new(),
            total: cases.len(),
            done: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn is_done(&self) -> bool {
        self.done == self.total
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn busy_count(&self) -> usize {
        self.slots.busy_count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn statistics(&self) -> &BTreeMap<Outcome, usize> {
        &self.statistics
    }

    pub fn into_statistics(self) -> BTreeMap<Outcome, usize> {
        self.statistics
    }

    /// Run one pass: dispatch to all idle slots, then finalize at most one
    /// terminal run. Launch failures abort the run; without its simulator
    /// the pool cannot proceed.
    pub fn step<E>(&mut self, engine: &E, verifier: &dyn OutputVerifier) -> SuiteResult<SchedulerPass>
    where
        E: SimulatorEngine<Run = R>,
    {
        let mut dispatched = 0;
        while !self.pending.is_empty() {
            let Some(slot) = self.slots.acquire() else {
                break;
            };
            // queue-pop and slot-bind are one committed step: no case is
            // ever double-dispatched or dropped
            let Some(case) = self.pending.pop_front() else {
                self.slots.release(slot);
                break;
            };
            let request = LaunchRequest::for_case(&case, &self.config);
            let run = engine.launch(&request)?;
            info!("dispatching {}", case.relative_name(&self.suite_root));
            self.in_flight.push(InFlight { slot, case, run });
            dispatched += 1;
        }

        let mut finalized = false;
        for index in 0..self.in_flight.len() {
            if self.in_flight[index].run.is_running() {
                continue;
            }
            let mut entry = self.in_flight.remove(index);
            self.done += 1;
            let outcome = report::report_case(&mut entry.run, &entry.case, verifier)?;
            *self.statistics.entry(outcome).or_insert(0) += 1;
            info!(
                "{:3} -- {}: {}",
                self.done,
                entry.case.relative_name(&self.suite_root),
                outcome
            );
            self.slots.release(entry.slot);
            finalized = true;
            break;
        }

        Ok(SchedulerPass { dispatched, finalized })
    }
}

/// Final result of a suite run.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Number of discovered (and finalized) test cases.
    pub total: usize,
    /// Outcome counts, keyed in sorted keyword order.
    pub statistics: BTreeMap<Outcome, usize>,
    /// Path of the consolidated report file.
    pub report_path: PathBuf,
}

impl SuiteReport {
    /// True when every case finished and verified clean.
    pub fn all_succeeded(&self) -> bool {
        self.statistics.get(&Outcome::Succeeded).copied().unwrap_or(0) == self.total
    }
}

/// A discovered suite of test cases, ready to be performed.
pub struct TestSuite {
    suite_root: PathBuf,
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Discover the cases under `root` matching `selector`. Fails with a
    /// configuration error when the selection is empty.
    pub fn discover(root: &Path, selector: &str) -> SuiteResult<Self> {
        let cases = discovery::discover(root, selector)?;
        // case paths are canonical; the stored root must match for relative names
        let suite_root = std::fs::canonicalize(root)?;
        Ok(Self { suite_root, cases })
    }

    pub fn suite_root(&self) -> &Path {
        &self.suite_root
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Prepare every case workspace. Called by [`TestSuite::perform`];
    /// exposed for callers that want the preparation step alone.
    pub fn prepare(&self) -> SuiteResult<()> {
        workspace::prepare(&self.cases)
    }

    /// Perform all test cases: prepare workspaces, run the scheduler loop to
    /// completion, then write the consolidated report at the suite root.
    ///
    /// Per-case crashes and verification failures are recorded outcomes and
    /// never abort the suite; configuration and launch errors do.
    pub fn perform<E: SimulatorEngine>(
        &self,
        engine: &E,
        config: &SuiteConfig,
        verifier: &dyn OutputVerifier,
    ) -> SuiteResult<SuiteReport> {
        let engine_info = engine.describe()?;
        let slot_count = self.cases.len().min(config.effective_capacity());

        info!("Using {}", engine_info.version);
        info!("With path {}", engine_info.path.display());
        info!(
            "Performing {} functional test case(s) in {} parallel processes...",
            self.cases.len(),
            slot_count
        );

        self.prepare()?;

        let mut scheduler = Scheduler::new(&self.cases, slot_count, &self.suite_root, config);
        loop {
            let pass = scheduler.step(engine, verifier)?;
            if scheduler.is_done() {
                break;
            }
            // nothing finalized: yield instead of busy-polling
            if !pass.finalized {
                thread::sleep(config.poll_interval);
            }
        }

        let total = scheduler.total();
        let statistics = scheduler.into_statistics();

        info!("Summary for {} test case(s):", total);
        for (outcome, count) in &statistics {
            info!("  {}: {}", outcome, count);
        }

        let report_path =
            report::write_consolidated(&engine_info, &self.suite_root, &self.cases, &statistics)?;

        Ok(SuiteReport {
            total,
            statistics,
            report_path,
        })
    }
}
