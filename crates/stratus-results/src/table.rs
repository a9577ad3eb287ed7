//! Aggregate result tables and their persistence backends.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use stratus_core::{ErrorInfo, HarnessError};

use crate::record::ResultRecord;

/// Row-oriented table with one shared schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Builds a table from records sharing one experiment class.
    ///
    /// The schema is fixed by the first record: fields absent from it but
    /// present in later records are silently dropped, and fields a later
    /// record lacks are written empty. This mirrors the historical
    /// collection behavior and is intentionally left unchanged.
    pub fn from_records(records: &[ResultRecord]) -> Result<Self, HarnessError> {
        let first = records.first().ok_or_else(|| {
            HarnessError::Parse(ErrorInfo::new("no-rows", "no result records to aggregate"))
        })?;
        let columns: Vec<String> = first.keys().map(str::to_string).collect();
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).unwrap_or("").to_string())
                    .collect()
            })
            .collect();
        Ok(ResultTable { columns, rows })
    }
}

/// Supported table persistence backends, selected by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStore {
    Csv(PathBuf),
    Sqlite(PathBuf),
}

impl TableStore {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("sqlite") | Some("db") => TableStore::Sqlite(path),
            _ => TableStore::Csv(path),
        }
    }

    pub fn write(&self, table: &ResultTable) -> Result<(), HarnessError> {
        match self {
            TableStore::Csv(path) => write_csv(path, table),
            TableStore::Sqlite(path) => write_sqlite(path, table),
        }
    }

    pub fn load(&self) -> Result<ResultTable, HarnessError> {
        match self {
            TableStore::Csv(path) => load_csv(path),
            TableStore::Sqlite(path) => load_sqlite(path),
        }
    }
}

fn write_csv(path: &Path, table: &ResultTable) -> Result<(), HarnessError> {
    let mut writer = csv::Writer::from_path(path).map_err(|err| wrap(path, err))?;
    writer
        .write_record(&table.columns)
        .map_err(|err| wrap(path, err))?;
    for row in &table.rows {
        writer.write_record(row).map_err(|err| wrap(path, err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap(path, csv::Error::from(err)))
}

fn load_csv(path: &Path) -> Result<ResultTable, HarnessError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| wrap(path, err))?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(|err| wrap(path, err))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| wrap(path, err))?;
        rows.push(row.iter().map(str::to_string).collect());
    }
    Ok(ResultTable { columns, rows })
}

fn wrap(path: &Path, err: csv::Error) -> HarnessError {
    HarnessError::Parse(
        ErrorInfo::new("table-io", "table persistence failed")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

fn wrap_sql(path: &Path, err: rusqlite::Error) -> HarnessError {
    HarnessError::Parse(
        ErrorInfo::new("table-sqlite", "sqlite table persistence failed")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

fn write_sqlite(path: &Path, table: &ResultTable) -> Result<(), HarnessError> {
    let conn = Connection::open(path).map_err(|err| wrap_sql(path, err))?;
    let column_defs: Vec<String> = table
        .columns
        .iter()
        .map(|column| format!("\"{column}\" TEXT"))
        .collect();
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS results ({})",
            column_defs.join(", ")
        ),
        [],
    )
    .map_err(|err| wrap_sql(path, err))?;

    let placeholders: Vec<String> = (1..=table.columns.len())
        .map(|idx| format!("?{idx}"))
        .collect();
    let insert = format!("INSERT INTO results VALUES ({})", placeholders.join(", "));
    for row in &table.rows {
        conn.execute(&insert, rusqlite::params_from_iter(row.iter()))
            .map_err(|err| wrap_sql(path, err))?;
    }
    Ok(())
}

fn load_sqlite(path: &Path) -> Result<ResultTable, HarnessError> {
    let conn = Connection::open(path).map_err(|err| wrap_sql(path, err))?;
    let mut statement = conn
        .prepare("SELECT * FROM results")
        .map_err(|err| wrap_sql(path, err))?;
    let columns: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let count = columns.len();
    let mut rows = Vec::new();
    let mut query = statement.query([]).map_err(|err| wrap_sql(path, err))?;
    while let Some(row) = query.next().map_err(|err| wrap_sql(path, err))? {
        let mut values = Vec::with_capacity(count);
        for idx in 0..count {
            let value: String = row.get(idx).map_err(|err| wrap_sql(path, err))?;
            values.push(value);
        }
        rows.push(values);
    }
    Ok(ResultTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> ResultRecord {
        let mut record = ResultRecord::new();
        for (key, value) in pairs {
            record.insert(*key, *value);
        }
        record
    }

    #[test]
    fn schema_is_fixed_by_first_record() {
        let records = vec![
            record(&[("runType", "budget"), ("runId", "0"), ("test_delayCost", "420.0")]),
            record(&[
                ("runType", "budget"),
                ("runId", "1"),
                ("test_delayCost", "300.5"),
                ("test_lateFlights", "9"),
            ]),
        ];
        let table = ResultTable::from_records(&records).unwrap();
        assert_eq!(table.columns, ["runType", "runId", "test_delayCost"]);
        // The later-only field is dropped.
        assert_eq!(table.rows[1], ["budget", "1", "300.5"]);
    }

    #[test]
    fn missing_fields_are_written_empty() {
        let records = vec![
            record(&[("runId", "0"), ("train_mean", "30")]),
            record(&[("runId", "1")]),
        ];
        let table = ResultTable::from_records(&records).unwrap();
        assert_eq!(table.rows[1], ["1", ""]);
    }

    #[test]
    fn empty_batch_is_an_error() {
        assert!(ResultTable::from_records(&[]).is_err());
    }

    #[test]
    fn csv_round_trip_preserves_values_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("budget_results.csv");
        let records = vec![record(&[
            ("runType", "budget"),
            ("runId", "3"),
            ("test_budget fraction", "0.25"),
            ("test_delayCost", "123.456789"),
        ])];
        let table = ResultTable::from_records(&records).unwrap();
        let store = TableStore::from_path(&path);
        store.write(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);
    }

    #[test]
    fn sqlite_round_trip_preserves_values_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("budget_results.sqlite");
        let records = vec![
            record(&[("runId", "0"), ("test_delayCost", "420.125")]),
            record(&[("runId", "1"), ("test_delayCost", "0.000001")]),
        ];
        let table = ResultTable::from_records(&records).unwrap();
        let store = TableStore::from_path(&path);
        assert!(matches!(store, TableStore::Sqlite(_)));
        store.write(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);
    }
}
