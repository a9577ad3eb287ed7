use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use stratus_core::{ErrorInfo, HarnessError};
use stratus_results::{
    collect_benders_records, collect_solution_records, ResultRecord, ResultTable, TableStore,
};
use stratus_run::ensure_dir;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Directory holding completed run directories.
    #[arg(long, default_value = "solution")]
    pub solutions: PathBuf,
    /// Directory the aggregate tables are written into.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Table file extension; `sqlite` or `db` selects the SQLite backend.
    #[arg(long, default_value = "csv")]
    pub format: String,
    /// Additionally scrape trace logs into per-class Benders tables.
    #[arg(long)]
    pub benders: bool,
}

fn by_class(records: Vec<ResultRecord>) -> BTreeMap<String, Vec<ResultRecord>> {
    let mut groups: BTreeMap<String, Vec<ResultRecord>> = BTreeMap::new();
    for record in records {
        let class = record.get("runType").unwrap_or("unknown").to_string();
        groups.entry(class).or_default().push(record);
    }
    groups
}

pub fn run(args: &CollectArgs) -> Result<(), HarnessError> {
    ensure_dir(&args.out)?;

    let records = collect_solution_records(&args.solutions)?;
    if records.is_empty() {
        return Err(HarnessError::Parse(
            ErrorInfo::new("no-rows", "no result rows parsed from solutions directory")
                .with_context("dir", args.solutions.display().to_string()),
        ));
    }
    for (class, group) in by_class(records) {
        let table = ResultTable::from_records(&group)?;
        let path = args.out.join(format!("{class}_results.{}", args.format));
        TableStore::from_path(&path).write(&table)?;
        info!(class = %class, rows = table.rows.len(), path = %path.display(), "wrote result table");
    }

    if args.benders {
        let records = collect_benders_records(&args.solutions)?;
        if records.is_empty() {
            warn!("no trace logs found, skipping Benders tables");
            return Ok(());
        }
        for (class, group) in by_class(records) {
            let table = ResultTable::from_records(&group)?;
            let path = args
                .out
                .join(format!("{class}_benders_results.{}", args.format));
            TableStore::from_path(&path).write(&table)?;
            info!(class = %class, rows = table.rows.len(), path = %path.display(), "wrote Benders table");
        }
    }
    Ok(())
}
