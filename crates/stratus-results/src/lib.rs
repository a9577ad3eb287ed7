//! Result parsing and aggregation for stratus.

mod collect;
mod record;
mod scrape;
mod summary;
mod table;

pub use collect::{collect_benders_records, collect_solution_records, records_from_artifacts};
pub use record::ResultRecord;
pub use scrape::{parse_invocation_line, scrape_benders_metrics, ANCHOR_SENTINEL, SCAN_WINDOW};
pub use summary::{parse_test_table, parse_training_summary, RESULT_FIELDS};
pub use table::{ResultTable, TableStore};
