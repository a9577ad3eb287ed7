use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use stratus_core::{ErrorInfo, ExperimentClass, HarnessError};
use stratus_sweep::{build_command, class_defaults, expand_stages, plan_sweep};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Experiment classes to plan.
    #[arg(long = "run-type", required = true, num_args = 1..)]
    pub run_types: Vec<ExperimentClass>,
    /// Directory holding instance schedule files.
    #[arg(long, default_value = "data/paper")]
    pub path: PathBuf,
    /// Instance names to sweep over.
    #[arg(long, num_args = 1.., default_values_t = ["s1", "s2", "s3", "s4", "s5"].map(String::from))]
    pub names: Vec<String>,
    /// Write the plan to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PlannedRun {
    run_id: u64,
    instance: String,
    value: String,
    repeat: u32,
    dir: String,
    stages: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct PlannedSweep {
    class: String,
    runs: Vec<PlannedRun>,
}

pub fn run(args: &PlanArgs) -> Result<(), HarnessError> {
    let mut sweeps = Vec::new();
    for class in &args.run_types {
        sweeps.push(plan_one(*class, &args.names, &args.path));
    }
    let rendered = serde_json::to_string_pretty(&sweeps).map_err(|err| {
        HarnessError::Parse(ErrorInfo::new("plan-encode", err.to_string()))
    })?;
    match &args.out {
        Some(path) => fs::write(path, rendered).map_err(|err| {
            HarnessError::Precondition(
                ErrorInfo::new("plan-write", "failed to write plan file")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn plan_one(class: ExperimentClass, names: &[String], data_path: &Path) -> PlannedSweep {
    let defaults = class_defaults(class, data_path);
    let runs = plan_sweep(class, names)
        .into_iter()
        .map(|descriptor| {
            let base = build_command(&descriptor, &defaults);
            let stages = expand_stages(&descriptor, &base)
                .into_iter()
                .map(|(_, spec)| spec.to_argv())
                .collect();
            PlannedRun {
                run_id: descriptor.run_id,
                instance: descriptor.instance.clone(),
                value: descriptor.sweep_label.clone(),
                repeat: descriptor.repeat,
                dir: descriptor.dir_name(),
                stages,
            }
        })
        .collect();
    PlannedSweep {
        class: class.label().to_string(),
        runs,
    }
}
