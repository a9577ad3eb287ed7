//! Assembly of parsed artifacts into flat result records.

use std::fs;
use std::path::Path;

use stratus_core::{ErrorInfo, HarnessError};
use stratus_run::{collect as collect_artifacts, parse_run_dir_name, ArtifactSet};
use tracing::{info, warn};

use crate::record::ResultRecord;
use crate::scrape::{parse_invocation_line, scrape_benders_metrics};
use crate::summary::{parse_test_table, parse_training_summary};

/// Builds one record per test row from a run's artifact set.
///
/// Training fields are repeated on every row, phase-prefixed, after the
/// run identity fields.
pub fn records_from_artifacts(
    set: &ArtifactSet,
    class: &str,
    run_id: u64,
) -> Result<Vec<ResultRecord>, HarnessError> {
    let train_fields = parse_training_summary(&set.training_summary)?;
    let test_rows = parse_test_table(&set.test_summary)?;

    let mut records = Vec::with_capacity(test_rows.len());
    for row in test_rows {
        let mut record = ResultRecord::new();
        record.insert("runType", class);
        record.insert("runId", run_id.to_string());
        for (key, value) in &train_fields {
            record.insert(format!("train_{key}"), value.clone());
        }
        for (key, value) in row {
            record.insert(format!("test_{key}"), value);
        }
        records.push(record);
    }
    Ok(records)
}

fn run_dirs(solutions_dir: &Path) -> Result<Vec<(String, String, u64)>, HarnessError> {
    let entries = fs::read_dir(solutions_dir).map_err(|err| {
        HarnessError::Artifact(
            ErrorInfo::new("solutions-dir-unreadable", "failed to read solutions directory")
                .with_context("dir", solutions_dir.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            HarnessError::Artifact(ErrorInfo::new("solutions-dir-unreadable", err.to_string()))
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some((class, run_id)) = parse_run_dir_name(&name) {
            dirs.push((name, class, run_id));
        }
    }
    // Deterministic collection order: class label, then numeric run id.
    dirs.sort_by(|a, b| (&a.1, a.2).cmp(&(&b.1, b.2)));
    Ok(dirs)
}

/// Collects summary records from every run directory under `solutions_dir`.
///
/// A run with missing or ambiguous artifacts loses only its own rows; the
/// failure is reported and collection continues with the other runs.
pub fn collect_solution_records(solutions_dir: &Path) -> Result<Vec<ResultRecord>, HarnessError> {
    let mut records = Vec::new();
    for (name, class, run_id) in run_dirs(solutions_dir)? {
        info!(run = %name, "parsing run directory");
        let set = match collect_artifacts(&solutions_dir.join(&name)) {
            Ok(set) => set,
            Err(err @ HarnessError::Artifact(_)) => {
                warn!(run = %name, error = %err, "skipping run with unusable artifacts");
                continue;
            }
            Err(err) => return Err(err),
        };
        records.extend(records_from_artifacts(&set, &class, run_id)?);
    }
    Ok(records)
}

/// Scrapes Benders metrics from every trace log under `solutions_dir`.
///
/// Training summaries do not carry Benders iteration statistics, so those
/// have to come from the trace logs. Runs without a trace log are skipped;
/// a log that exists but cannot be interpreted fails the pass.
pub fn collect_benders_records(solutions_dir: &Path) -> Result<Vec<ResultRecord>, HarnessError> {
    let mut records = Vec::new();
    for (name, class, run_id) in run_dirs(solutions_dir)? {
        let log_path = solutions_dir.join(&name).join(stratus_run::TRACE_LOG_NAME);
        if !log_path.is_file() {
            continue;
        }
        let text = fs::read_to_string(&log_path).map_err(|err| {
            HarnessError::Parse(
                ErrorInfo::new("trace-log-unreadable", "failed to read trace log")
                    .with_context("path", log_path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let lines: Vec<String> = text.lines().map(str::to_string).collect();

        let mut record = ResultRecord::new();
        record.insert("runType", class.clone());
        record.insert("runId", run_id.to_string());
        record.extend(parse_invocation_line(&lines)?);
        record.extend(scrape_benders_metrics(&lines)?);
        records.push(record);
    }
    Ok(records)
}
