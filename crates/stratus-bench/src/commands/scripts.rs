use std::fs;
use std::path::PathBuf;

use clap::Args;
use stratus_core::{ErrorInfo, ExperimentClass, HarnessError};
use tracing::info;

/// Emits one submission line per (class, instance) so long batches can be
/// split into separately scheduled cluster jobs.
#[derive(Args, Debug)]
pub struct ScriptsArgs {
    /// Experiment classes to cover.
    #[arg(long = "run-type", num_args = 1.., default_values_t = ExperimentClass::ALL)]
    pub run_types: Vec<ExperimentClass>,
    /// Directory holding instance schedule files.
    #[arg(long, default_value = "data/paper")]
    pub path: PathBuf,
    /// Instance names to sweep over.
    #[arg(long, num_args = 1.., default_values_t = ["s1", "s2", "s3", "s4", "s5"].map(String::from))]
    pub names: Vec<String>,
    /// Script file to write.
    #[arg(long, default_value = "submit_runs.sh")]
    pub out: PathBuf,
}

pub fn run(args: &ScriptsArgs) -> Result<(), HarnessError> {
    let mut lines = Vec::new();
    for class in &args.run_types {
        for name in &args.names {
            lines.push(format!(
                "stratus-bench batch --run-type {} --path {} --names {}",
                class.label(),
                args.path.display(),
                name
            ));
        }
    }
    let mut script = lines.join("\n");
    script.push('\n');
    fs::write(&args.out, script).map_err(|err| {
        HarnessError::Precondition(
            ErrorInfo::new("script-write", "failed to write submission script")
                .with_context("path", args.out.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    info!(lines = lines.len(), path = %args.out.display(), "wrote submission script");
    Ok(())
}
