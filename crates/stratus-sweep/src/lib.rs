//! Sweep planning and deterministic command construction for stratus.

mod command;
mod plan;
mod stages;

pub use command::{build_command, class_defaults, CommandSpec};
pub use plan::{plan_sweep, shape, SweepShape, TIME_REPEATS};
pub use stages::{expand_stages, RunStage, SolveModel};
