//! Locates the expected output files of a completed run.

use std::fs;
use std::path::{Path, PathBuf};

use stratus_core::{ErrorInfo, HarnessError};

use crate::executor::TRACE_LOG_NAME;

/// Paths of the artifacts one run is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub run_dir: PathBuf,
    pub training_summary: PathBuf,
    pub test_summary: PathBuf,
    pub trace_log: Option<PathBuf>,
}

fn is_training_summary(name: &str) -> bool {
    name.ends_with(".yaml") && name.contains("_training")
}

fn is_test_summary(name: &str) -> bool {
    name.ends_with(".csv") && name.contains("_test")
}

/// Collects the artifact set for one run directory.
///
/// Collection fails closed: zero or multiple candidates for either summary
/// is an error for this run; already-collected runs are unaffected. The
/// trace log is optional.
pub fn collect(run_dir: &Path) -> Result<ArtifactSet, HarnessError> {
    let mut names = Vec::new();
    let entries = fs::read_dir(run_dir).map_err(|err| {
        HarnessError::Artifact(
            ErrorInfo::new("run-dir-unreadable", "failed to read run directory")
                .with_context("dir", run_dir.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| {
            HarnessError::Artifact(ErrorInfo::new("run-dir-unreadable", err.to_string()))
        })?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();

    let training = exactly_one(run_dir, &names, is_training_summary, "training summary")?;
    let test = exactly_one(run_dir, &names, is_test_summary, "test summary")?;
    let trace_log = names
        .iter()
        .find(|name| name.as_str() == TRACE_LOG_NAME)
        .map(|name| run_dir.join(name));

    Ok(ArtifactSet {
        run_dir: run_dir.to_path_buf(),
        training_summary: training,
        test_summary: test,
        trace_log,
    })
}

fn exactly_one(
    run_dir: &Path,
    names: &[String],
    matches: fn(&str) -> bool,
    what: &str,
) -> Result<PathBuf, HarnessError> {
    let found: Vec<&String> = names.iter().filter(|name| matches(name)).collect();
    match found.as_slice() {
        [single] => Ok(run_dir.join(single)),
        [] => Err(HarnessError::Artifact(
            ErrorInfo::new("artifact-missing", format!("no {what} file in run directory"))
                .with_context("dir", run_dir.display().to_string()),
        )),
        many => Err(HarnessError::Artifact(
            ErrorInfo::new("artifact-ambiguous", format!("multiple {what} files in run directory"))
                .with_context("dir", run_dir.display().to_string())
                .with_context("count", many.len().to_string())
                .with_hint("remove stale files before collecting"),
        )),
    }
}

/// Parses a run-directory name back into (experiment class label, run id).
pub fn parse_run_dir_name(name: &str) -> Option<(String, u64)> {
    let rest = name.strip_prefix("solution_")?;
    let (class, id) = rest.rsplit_once('_')?;
    if class.is_empty() {
        return None;
    }
    Some((class.to_string(), id.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn collects_unique_summaries() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "s1_training_summary.yaml");
        write(tmp.path(), "s1_test_summary.csv");
        write(tmp.path(), "solver.log");
        let set = collect(tmp.path()).unwrap();
        assert!(set.training_summary.ends_with("s1_training_summary.yaml"));
        assert!(set.test_summary.ends_with("s1_test_summary.csv"));
        assert!(set.trace_log.is_some());
    }

    #[test]
    fn missing_summary_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "s1_training_summary.yaml");
        let err = collect(tmp.path()).unwrap_err();
        assert_eq!(err.info().code, "artifact-missing");
    }

    #[test]
    fn ambiguous_summary_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "s1_training_summary.yaml");
        write(tmp.path(), "s2_training_summary.yaml");
        write(tmp.path(), "s1_test_summary.csv");
        let err = collect(tmp.path()).unwrap_err();
        assert_eq!(err.info().code, "artifact-ambiguous");
    }

    #[test]
    fn trace_log_is_optional() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "s1_training_summary.yaml");
        write(tmp.path(), "s1_test_summary.csv");
        let set = collect(tmp.path()).unwrap();
        assert!(set.trace_log.is_none());
    }

    #[test]
    fn run_dir_names_round_trip() {
        assert_eq!(
            parse_run_dir_name("solution_budget_12"),
            Some(("budget".to_string(), 12))
        );
        assert_eq!(parse_run_dir_name("solution__3"), None);
        assert_eq!(parse_run_dir_name("notes.txt"), None);
    }
}
