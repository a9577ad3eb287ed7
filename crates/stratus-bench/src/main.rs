use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use commands::{
    batch::{self, BatchArgs},
    collect::{self, CollectArgs},
    doctor::{self, DoctorArgs},
    plan::{self, PlanArgs},
    scripts::{self, ScriptsArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "stratus-bench",
    about = "Batch experiment harness for the stochastic rescheduling solver"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan and execute one or more experiment sweeps.
    Batch(BatchArgs),
    /// Collect solver artifacts into aggregate result tables.
    Collect(CollectArgs),
    /// Print the planned runs and their solver invocations without executing.
    Plan(PlanArgs),
    /// Emit a cluster submission script covering the planned runs.
    Scripts(ScriptsArgs),
    /// Check the solver setup and report the findings.
    Doctor(DoctorArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Batch(args) => batch::run(args),
        Command::Collect(args) => collect::run(args),
        Command::Plan(args) => plan::run(args),
        Command::Scripts(args) => scripts::run(args),
        Command::Doctor(args) => doctor::run(args),
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}
