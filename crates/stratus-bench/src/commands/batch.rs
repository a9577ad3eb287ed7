use std::path::PathBuf;

use clap::Args;
use stratus_core::{ExperimentClass, HarnessError};
use stratus_run::{execute_batch, guess_native_lib_path, purge_delay_files, SolverEnv};
use stratus_sweep::plan_sweep;
use tracing::info;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Experiment classes to run, in order.
    #[arg(long = "run-type", required = true, num_args = 1..)]
    pub run_types: Vec<ExperimentClass>,
    /// Directory holding instance schedule files.
    #[arg(long, default_value = "data/paper")]
    pub path: PathBuf,
    /// Instance names to sweep over.
    #[arg(long, num_args = 1.., default_values_t = ["s1", "s2", "s3", "s4", "s5"].map(String::from))]
    pub names: Vec<String>,
    /// Path to the solver uberjar.
    #[arg(long, default_value = "build/libs/stochastic_uber.jar")]
    pub jar: PathBuf,
    /// Native library directory; guessed from gradle.properties when absent.
    #[arg(long = "lib-path")]
    pub lib_path: Option<PathBuf>,
    /// Shared output location for run directories.
    #[arg(long, default_value = "solution")]
    pub out: PathBuf,
    /// Directory for harness log files.
    #[arg(long, default_value = "logs")]
    pub logs: PathBuf,
    /// Runtime binary used to launch the solver.
    #[arg(long, default_value = "java")]
    pub launcher: PathBuf,
}

pub fn run(args: &BatchArgs) -> Result<(), HarnessError> {
    let native_lib_path = match &args.lib_path {
        Some(path) => path.clone(),
        None => guess_native_lib_path()?,
    };
    let env = SolverEnv {
        launcher: args.launcher.clone(),
        jar_path: args.jar.clone(),
        native_lib_path,
        solution_dir: args.out.clone(),
        logs_dir: args.logs.clone(),
    };
    env.validate()?;

    for class in &args.run_types {
        info!(class = class.label(), "starting batch run");
        let descriptors = plan_sweep(*class, &args.names);
        execute_batch(&env, *class, &descriptors, &args.path)?;
        // Sweeps share one output location; stale delay data from this sweep
        // must not leak into the next one.
        purge_delay_files(&env.solution_dir)?;
    }
    info!("completed all batch runs");
    Ok(())
}
