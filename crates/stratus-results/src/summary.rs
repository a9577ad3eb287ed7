//! Structured parsing of training and test summaries.

use std::fs;
use std::path::Path;

use stratus_core::{ErrorInfo, HarnessError};

/// Semantic fields projected out of both summary documents. Anything else
/// the solver writes is ignored.
pub const RESULT_FIELDS: [&str; 12] = [
    "instance",
    "strategy",
    "distribution",
    "mean",
    "standard deviation",
    "budget fraction",
    "approach",
    "rescheduleCost",
    "twoStageObjective",
    "delayCost",
    "totalExcessDelay",
    "delaySolutionTimeInSec",
];

fn wanted(key: &str) -> bool {
    RESULT_FIELDS.contains(&key)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Reads a key/value training summary and projects it onto the field
/// whitelist, preserving the document's field order.
pub fn parse_training_summary(path: &Path) -> Result<Vec<(String, String)>, HarnessError> {
    let text = fs::read_to_string(path).map_err(|err| {
        HarnessError::Parse(
            ErrorInfo::new("summary-unreadable", "failed to read training summary")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let document: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|err| {
        HarnessError::Parse(
            ErrorInfo::new("summary-malformed", "training summary is not valid YAML")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let mapping = document.as_mapping().ok_or_else(|| {
        HarnessError::Parse(
            ErrorInfo::new("summary-malformed", "training summary is not a key/value mapping")
                .with_context("path", path.display().to_string()),
        )
    })?;

    let mut fields = Vec::new();
    for (key, value) in mapping {
        let Some(key) = key.as_str() else { continue };
        if !wanted(key) {
            continue;
        }
        let value = scalar_to_string(value).ok_or_else(|| {
            HarnessError::Parse(
                ErrorInfo::new("summary-field-malformed", "non-scalar value for summary field")
                    .with_context("path", path.display().to_string())
                    .with_context("field", key),
            )
        })?;
        fields.push((key.to_string(), value));
    }
    Ok(fields)
}

/// Reads a delimited test table and projects each row onto the field
/// whitelist, preserving column order.
pub fn parse_test_table(path: &Path) -> Result<Vec<Vec<(String, String)>>, HarnessError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        HarnessError::Parse(
            ErrorInfo::new("table-unreadable", "failed to open test table")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let headers = reader
        .headers()
        .map_err(|err| wrap_csv(path, err))?
        .clone();

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| wrap_csv(path, err))?;
        let mut fields = Vec::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            if wanted(header) {
                fields.push((header.to_string(), value.to_string()));
            }
        }
        rows.push(fields);
    }
    Ok(rows)
}

fn wrap_csv(path: &Path, err: csv::Error) -> HarnessError {
    HarnessError::Parse(
        ErrorInfo::new("table-malformed", "failed to parse test table")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_summary_projects_whitelist_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("s1_training_summary.yaml");
        fs::write(
            &path,
            "instance: s1\nsolverVersion: 12.9\nmean: 30\nrescheduleCost: 1250.5\n",
        )
        .unwrap();
        let fields = parse_training_summary(&path).unwrap();
        assert_eq!(
            fields,
            vec![
                ("instance".to_string(), "s1".to_string()),
                ("mean".to_string(), "30".to_string()),
                ("rescheduleCost".to_string(), "1250.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_table_projects_each_row() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("s1_test_summary.csv");
        fs::write(
            &path,
            "approach,delayCost,solverNodes\nnaive,420.0,17\nbenders,355.25,90\n",
        )
        .unwrap();
        let rows = parse_test_table(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            vec![
                ("approach".to_string(), "benders".to_string()),
                ("delayCost".to_string(), "355.25".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_yaml_is_a_parse_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "instance: [unclosed\n").unwrap();
        let err = parse_training_summary(&path).unwrap_err();
        assert!(matches!(err, HarnessError::Parse(_)));
    }
}
