//! Result verification and reporting
//!
//! Classification is two-staged: a run whose terminal status is not
//! `Finished` is `Crashed` outright, without inspecting any output. A
//! finished run is handed to the [`OutputVerifier`], which decides between
//! `Succeeded` and `Failed`. The comparison against reference data is a
//! pluggable extension point; the stock [`AcceptFinished`] verifier accepts
//! every finished run.
//!
//! Each finalized case gets a one-line report file in its `out` directory.
//! After the whole suite is done, one consolidated report is written at the
//! suite root: header, sorted outcome summary, then the per-case report
//! contents in discovery order.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use super::discovery::TestCase;
use super::engine::{EngineInfo, RunStatus, SimulationRun};
use super::error::SuiteResult;

/// Name of the per-case report file inside the case's `out` directory.
pub const CASE_REPORT_FILE: &str = "_testreport.txt";

/// Suffix of the consolidated report file at the suite root.
pub const SUITE_REPORT_SUFFIX: &str = "_testreport.txt";

/// Separator line between consolidated report sections.
const SEPARATOR: &str = "---------------";

/// Classification of one finalized test case.
///
/// The variant order is the lexicographic order of the keywords, so a
/// `BTreeMap<Outcome, _>` iterates summary lines in sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Outcome {
    Crashed,
    Failed,
    Succeeded,
}

impl Outcome {
    pub fn keyword(&self) -> &'static str {
        match self {
            Outcome::Crashed => "Crashed",
            Outcome::Failed => "Failed",
            Outcome::Succeeded => "Succeeded",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Verdict of an output verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

/// Compares a finished case's output against its reference data.
///
/// The comparison algorithm is deliberately unspecified here; implement this
/// trait to plug in a real one.
pub trait OutputVerifier {
    fn verify(&self, case: &TestCase) -> Verdict;
}

/// Placeholder verifier that accepts every finished run.
pub struct AcceptFinished;

impl OutputVerifier for AcceptFinished {
    fn verify(&self, _case: &TestCase) -> Verdict {
        Verdict::Pass
    }
}

/// Classify a completed run and write the per-case report file.
///
/// A non-`Finished` terminal status yields `Crashed` immediately; a finished
/// run proceeds to verification. The report file contains exactly the
/// outcome keyword.
pub fn report_case<R: SimulationRun>(
    run: &mut R,
    case: &TestCase,
    verifier: &dyn OutputVerifier,
) -> SuiteResult<Outcome> {
    let outcome = if run.status() != RunStatus::Finished {
        Outcome::Crashed
    } else {
        match verifier.verify(case) {
            Verdict::Pass => Outcome::Succeeded,
            Verdict::Fail(reason) => {
                debug!("verification failed for '{}': {}", case.case_dir().display(), reason);
                Outcome::Failed
            }
        }
    };

    fs::write(
        case.output_dir().join(CASE_REPORT_FILE),
        format!("{}\n", outcome.keyword()),
    )?;
    Ok(outcome)
}

/// Render the consolidated report: header, sorted summary, then per-case
/// blocks in the given (discovery) order. Reads each case's report file.
pub fn render_consolidated(
    info: &EngineInfo,
    suite_root: &Path,
    cases: &[TestCase],
    statistics: &BTreeMap<Outcome, usize>,
) -> SuiteResult<String> {
    let mut text = String::new();
    text.push_str(&format!("Using {}\n", info.version));
    text.push_str(&format!("With path {}\n", info.path.display()));
    text.push_str(&format!("Summary for {} test case(s):\n", cases.len()));
    for (outcome, count) in statistics {
        text.push_str(&format!("  {}: {}\n", outcome, count));
    }
    text.push_str(SEPARATOR);
    text.push('\n');

    for case in cases {
        let contents = fs::read_to_string(case.output_dir().join(CASE_REPORT_FILE))?;
        text.push_str(&format!("{}: {}", case.relative_name(suite_root), contents));
    }

    text.push_str(SEPARATOR);
    text.push('\n');
    Ok(text)
}

/// Write the consolidated report at the suite root, named with a collating
/// timestamp prefix. Returns the report path.
pub fn write_consolidated(
    info: &EngineInfo,
    suite_root: &Path,
    cases: &[TestCase],
    statistics: &BTreeMap<Outcome, usize>,
) -> SuiteResult<PathBuf> {
    let text = render_consolidated(info, suite_root, cases, statistics)?;
    let stamp = Local::now().format("%Y-%m-%d--%H-%M-%S");
    let path = suite_root.join(format!("{}{}", stamp, SUITE_REPORT_SUFFIX));
    fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FakeRun {
        status: RunStatus,
        definition: PathBuf,
        output_dir: PathBuf,
    }

    impl FakeRun {
        fn for_case(case: &TestCase, status: RunStatus) -> Self {
            Self {
                status,
                definition: case.definition_file().to_path_buf(),
                output_dir: case.output_dir(),
            }
        }
    }

    impl SimulationRun for FakeRun {
        fn is_running(&mut self) -> bool {
            self.status == RunStatus::Running
        }
        fn status(&mut self) -> RunStatus {
            self.status
        }
        fn definition_file(&self) -> &Path {
            &self.definition
        }
        fn output_dir(&self) -> &Path {
            &self.output_dir
        }
    }

    struct RejectAll;
    impl OutputVerifier for RejectAll {
        fn verify(&self, _case: &TestCase) -> Verdict {
            Verdict::Fail("mismatch".into())
        }
    }

    fn make_case(root: &Path, name: &str) -> TestCase {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("out")).unwrap();
        fs::write(dir.join("run.sim"), "").unwrap();
        TestCase::new(dir.join("run.sim"))
    }

    #[test]
    fn outcome_order_is_lexicographic() {
        let keywords: Vec<&str> = [Outcome::Crashed, Outcome::Failed, Outcome::Succeeded]
            .iter()
            .map(|o| o.keyword())
            .collect();
        let mut sorted = keywords.clone();
        sorted.sort();
        assert_eq!(keywords, sorted);
    }

    #[test]
    fn non_finished_status_is_crashed_without_verification() {
        let tmp = tempfile::tempdir().unwrap();
        let case = make_case(tmp.path(), "Case1");
        let mut run = FakeRun::for_case(&case, RunStatus::Aborted);

        // a verifier that would pass must not be consulted
        let outcome = report_case(&mut run, &case, &AcceptFinished).unwrap();
        assert_eq!(outcome, Outcome::Crashed);
        let report = fs::read_to_string(case.output_dir().join(CASE_REPORT_FILE)).unwrap();
        assert_eq!(report, "Crashed\n");
    }

    #[test]
    fn finished_status_proceeds_to_verification() {
        let tmp = tempfile::tempdir().unwrap();
        let case = make_case(tmp.path(), "Case1");

        let mut run = FakeRun::for_case(&case, RunStatus::Finished);
        assert_eq!(report_case(&mut run, &case, &AcceptFinished).unwrap(), Outcome::Succeeded);

        let mut run = FakeRun::for_case(&case, RunStatus::Finished);
        assert_eq!(report_case(&mut run, &case, &RejectAll).unwrap(), Outcome::Failed);
        let report = fs::read_to_string(case.output_dir().join(CASE_REPORT_FILE)).unwrap();
        assert_eq!(report, "Failed\n");
    }

    #[test]
    fn consolidated_report_orders_cases_by_discovery_not_completion() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let a = make_case(root, "A");
        let b = make_case(root, "B");
        let c = make_case(root, "C");

        // finalize out of order: C, A, B
        for (case, status) in [(&c, RunStatus::Finished), (&a, RunStatus::Finished), (&b, RunStatus::Aborted)] {
            let mut run = FakeRun::for_case(case, status);
            report_case(&mut run, case, &AcceptFinished).unwrap();
        }

        let mut statistics = BTreeMap::new();
        statistics.insert(Outcome::Succeeded, 2);
        statistics.insert(Outcome::Crashed, 1);

        let info = EngineInfo {
            version: "Helios v9.0".into(),
            path: PathBuf::from("/opt/helios/bin/helios"),
        };
        let cases = vec![a, b, c];
        let text = render_consolidated(&info, root, &cases, &statistics).unwrap();

        let expected = "\
Using Helios v9.0
With path /opt/helios/bin/helios
Summary for 3 test case(s):
  Crashed: 1
  Succeeded: 2
---------------
A: Succeeded
B: Crashed
C: Succeeded
---------------
";
        assert_eq!(text, expected);
    }

    #[test]
    fn written_report_lands_at_the_suite_root_with_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let case = make_case(root, "Case1");
        let mut run = FakeRun::for_case(&case, RunStatus::Finished);
        report_case(&mut run, &case, &AcceptFinished).unwrap();

        let mut statistics = BTreeMap::new();
        statistics.insert(Outcome::Succeeded, 1);
        let info = EngineInfo {
            version: "Helios v9.0".into(),
            path: PathBuf::from("helios"),
        };

        let path = write_consolidated(&info, root, std::slice::from_ref(&case), &statistics).unwrap();
        assert_eq!(path.parent().unwrap(), root);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(SUITE_REPORT_SUFFIX));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("---------------\n"));
    }
}
