//! Test case discovery
//!
//! Resolves a selector string to a set of candidate directories beneath the
//! suite root, then collects every directory that holds exactly one `.sim`
//! definition file. The result is deduplicated and lexicographically sorted,
//! so repeated runs enumerate cases identically.
//!
//! Selector forms:
//! - `"."` (or empty) - the suite root itself, i.e. the whole suite
//! - `"name"` - every directory anywhere under the root with that name
//! - `"parent/name"` - every directory `name` immediately inside a
//!   directory `parent` (disambiguates same-named sub-suites)

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{SuiteError, SuiteResult};

/// Filename extension marking a simulation definition file.
pub const DEFINITION_EXT: &str = "sim";

/// Name of the per-case input subdirectory (read-only to the runner).
pub const INPUT_DIR: &str = "in";
/// Name of the per-case reference subdirectory (read-only to the runner).
pub const REFERENCE_DIR: &str = "ref";
/// Name of the per-case output subdirectory (cleared before each run).
pub const OUTPUT_DIR: &str = "out";

/// A single test case, identified by the path of its definition file.
///
/// The case directory is the definition file's parent; the `in`, `ref` and
/// `out` subdirectories live next to the definition file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestCase {
    definition: PathBuf,
}

impl TestCase {
    pub fn new(definition: impl Into<PathBuf>) -> Self {
        Self {
            definition: definition.into(),
        }
    }

    /// Path of the `.sim` definition file.
    pub fn definition_file(&self) -> &Path {
        &self.definition
    }

    /// The case directory (parent of the definition file).
    pub fn case_dir(&self) -> &Path {
        self.definition.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn input_dir(&self) -> PathBuf {
        self.case_dir().join(INPUT_DIR)
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.case_dir().join(REFERENCE_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.case_dir().join(OUTPUT_DIR)
    }

    /// Identifying path of the case directory relative to the suite root,
    /// used in log lines and the consolidated report. Falls back to the full
    /// path if the case lies outside the root.
    pub fn relative_name(&self, suite_root: &Path) -> String {
        let dir = self.case_dir();
        let rel = dir.strip_prefix(suite_root).unwrap_or(dir);
        if rel.as_os_str().is_empty() {
            ".".to_string()
        } else {
            rel.display().to_string()
        }
    }
}

/// Discover all valid test cases under `root` matching `selector`.
///
/// Returns cases in lexicographic order of their definition paths. Fails
/// with [`SuiteError::Configuration`] when the selector is malformed or the
/// resulting set is empty.
pub fn discover(root: &Path, selector: &str) -> SuiteResult<Vec<TestCase>> {
    let root = fs::canonicalize(root).map_err(|e| {
        SuiteError::Configuration(format!("suite directory '{}' not usable: {}", root.display(), e))
    })?;

    let candidates = resolve_selector(&root, selector)?;

    let mut definitions: BTreeSet<PathBuf> = BTreeSet::new();
    for candidate in &candidates {
        collect_cases(candidate, &mut definitions)?;
    }

    if definitions.is_empty() {
        return Err(SuiteError::Configuration(format!(
            "no valid test cases found for selector '{}'",
            selector
        )));
    }

    Ok(definitions.into_iter().map(TestCase::new).collect())
}

/// Resolve the selector to candidate directories beneath (or equal to) the root.
fn resolve_selector(root: &Path, selector: &str) -> SuiteResult<Vec<PathBuf>> {
    if selector.is_empty() || selector == "." {
        return Ok(vec![root.to_path_buf()]);
    }

    let (parent, name) = match selector.split_once('/') {
        None => (None, selector),
        Some((parent, name)) => {
            if parent.is_empty() || name.is_empty() || name.contains('/') {
                return Err(SuiteError::Configuration(format!(
                    "malformed selector '{}': expected '.', 'name' or 'parent/name'",
                    selector
                )));
            }
            (Some(parent), name)
        }
    };

    let mut candidates = Vec::new();
    find_matching_dirs(root, parent, name, &mut candidates)?;
    Ok(candidates)
}

/// Recursively find directories under `dir` whose name is `name` and, when
/// `parent` is given, whose immediate parent directory is named `parent`.
/// Matching directories are still recursed into (sub-suites may nest).
fn find_matching_dirs(
    dir: &Path,
    parent: Option<&str>,
    name: &str,
    matches: &mut Vec<PathBuf>,
) -> SuiteResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if dir_name.starts_with('.') {
            continue;
        }
        if dir_name == name {
            let parent_ok = match parent {
                None => true,
                Some(parent) => dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n == parent),
            };
            if parent_ok {
                matches.push(path.clone());
            }
        }
        find_matching_dirs(&path, parent, name, matches)?;
    }
    Ok(())
}

/// Recursively collect definition files under `dir`, applying the
/// one-definition-per-directory rule: a `.sim` file counts as a case only if
/// it is the sole `.sim` file in its immediate parent directory.
fn collect_cases(dir: &Path, definitions: &mut BTreeSet<PathBuf>) -> SuiteResult<()> {
    let mut local_defs: Vec<PathBuf> = Vec::new();
    let mut subdirs: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_dir() {
            if !name.starts_with('.') {
                subdirs.push(path);
            }
        } else if path.extension().is_some_and(|e| e == DEFINITION_EXT) {
            local_defs.push(path);
        }
    }

    match local_defs.len() {
        0 => {}
        1 => {
            // dedup across overlapping selector expansions happens in the set
            definitions.extend(local_defs);
        }
        n => {
            warn!(
                "ignoring '{}': {} definition files in one directory (ambiguous test case)",
                dir.display(),
                n
            );
        }
    }

    for subdir in subdirs {
        collect_cases(&subdir, definitions)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn dot_selector_finds_all_cases_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("Geometries/CaseB/b.sim"));
        touch(&root.join("Geometries/CaseA/a.sim"));
        touch(&root.join("Instruments/CaseC/c.sim"));

        let cases = discover(root, ".").unwrap();
        let names: Vec<String> = cases
            .iter()
            .map(|c| c.relative_name(&fs::canonicalize(root).unwrap()))
            .collect();
        assert_eq!(
            names,
            vec!["Geometries/CaseA", "Geometries/CaseB", "Instruments/CaseC"]
        );
    }

    #[test]
    fn discovery_is_deterministic_across_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        for name in ["Zeta", "Alpha", "Mid"] {
            touch(&root.join(name).join("run.sim"));
        }
        let first = discover(root, ".").unwrap();
        let second = discover(root, ".").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn directory_with_multiple_definitions_is_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("Good/run.sim"));
        touch(&root.join("Ambiguous/one.sim"));
        touch(&root.join("Ambiguous/two.sim"));

        let cases = discover(root, ".").unwrap();
        assert_eq!(cases.len(), 1);
        assert!(cases[0].definition_file().ends_with("Good/run.sim"));
    }

    #[test]
    fn bare_name_selector_matches_everywhere() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("Radial/Case1/r.sim"));
        touch(&root.join("Cylindrical/Case1/c.sim"));
        touch(&root.join("Cylindrical/Case2/c2.sim"));

        let cases = discover(root, "Case1").unwrap();
        assert_eq!(cases.len(), 2);
    }

    #[test]
    fn qualified_selector_disambiguates_by_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("Radial/Case1/r.sim"));
        touch(&root.join("Cylindrical/Case1/c.sim"));

        let cases = discover(root, "Cylindrical/Case1").unwrap();
        assert_eq!(cases.len(), 1);
        assert!(cases[0].definition_file().ends_with("Cylindrical/Case1/c.sim"));
    }

    #[test]
    fn overlapping_expansions_do_not_duplicate_cases() {
        // "Case1" matches the same physical directory reachable once; a
        // selector matching both a sub-suite and a nested dir of the same
        // name must still yield each case exactly once.
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("Suite/Suite/x.sim"));

        let cases = discover(root, "Suite").unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn empty_selection_is_a_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discover(tmp.path(), ".").unwrap_err();
        assert!(matches!(err, SuiteError::Configuration(_)));

        touch(&tmp.path().join("Case/run.sim"));
        let err = discover(tmp.path(), "NoSuchSuite").unwrap_err();
        assert!(matches!(err, SuiteError::Configuration(_)));
    }

    #[test]
    fn malformed_selector_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("Case/run.sim"));
        let err = discover(tmp.path(), "a/b/c").unwrap_err();
        assert!(matches!(err, SuiteError::Configuration(_)));
    }

    #[test]
    fn case_paths_derive_from_definition_file() {
        let case = TestCase::new("/suite/Geometries/Case1/disk.sim");
        assert_eq!(case.case_dir(), Path::new("/suite/Geometries/Case1"));
        assert_eq!(case.input_dir(), Path::new("/suite/Geometries/Case1/in"));
        assert_eq!(case.reference_dir(), Path::new("/suite/Geometries/Case1/ref"));
        assert_eq!(case.output_dir(), Path::new("/suite/Geometries/Case1/out"));
        assert_eq!(case.relative_name(Path::new("/suite")), "Geometries/Case1");
        assert_eq!(case.relative_name(Path::new("/suite/Geometries/Case1")), ".");
    }
}
