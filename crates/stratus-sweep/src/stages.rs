//! Expansion of a run descriptor into its ordered solver invocations.
//!
//! A single descriptor maps to several sequential solver calls sharing one
//! scenario-delay set: the generation call writes the delay files and the
//! later calls consume them via the parse-delays flag. The expansion is a
//! pure function so the sequencing can be tested without spawning anything.

use serde::{Deserialize, Serialize};
use stratus_core::{ParamKey, ParamValue, RunDescriptor};

use crate::command::CommandSpec;
use crate::plan::{shape, SweepShape};

/// Models trained during quality-shaped sweeps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveModel {
    Naive,
    Dep,
    Benders,
}

impl SolveModel {
    pub const ALL: [SolveModel; 3] = [SolveModel::Naive, SolveModel::Dep, SolveModel::Benders];

    pub fn label(&self) -> &'static str {
        match self {
            SolveModel::Naive => "naive",
            SolveModel::Dep => "dep",
            SolveModel::Benders => "benders",
        }
    }
}

/// One solver call within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStage {
    GenerateDelays,
    Train(SolveModel),
    Test,
    /// Training pass with the expected-excess objective enabled.
    TrainExcess(SolveModel),
    /// Test pass with the expected-excess objective enabled.
    TestExcess,
    /// Single timed solve reusing previously generated delays.
    Solve,
}

/// Expands a descriptor into `(stage, command)` pairs, in execution order.
pub fn expand_stages(descriptor: &RunDescriptor, base: &CommandSpec) -> Vec<(RunStage, CommandSpec)> {
    match shape(descriptor.class) {
        SweepShape::Quality => expand_quality(descriptor, base),
        SweepShape::Time => expand_time(descriptor, base),
    }
}

fn generate_spec(base: &CommandSpec) -> CommandSpec {
    let mut spec = base.clone();
    spec.set(ParamKey::GenerateDelays, ParamValue::Switch);
    // Generation does not solve anything.
    spec.unset(ParamKey::Model);
    spec.unset(ParamKey::ParseDelays);
    spec
}

fn training_spec(base: &CommandSpec, model: SolveModel) -> CommandSpec {
    let mut spec = base.clone();
    spec.set(ParamKey::Model, ParamValue::text(model.label()));
    spec.set(ParamKey::ParseDelays, ParamValue::Switch);
    spec.set(ParamKey::Phase, ParamValue::text("training"));
    spec.unset(ParamKey::NumScenarios);
    spec
}

fn test_spec(base: &CommandSpec, parse_delays: bool) -> CommandSpec {
    let mut spec = base.clone();
    spec.set(ParamKey::Phase, ParamValue::text("test"));
    if parse_delays {
        spec.set(ParamKey::ParseDelays, ParamValue::Switch);
    }
    spec.unset(ParamKey::NumScenarios);
    spec
}

fn expand_quality(descriptor: &RunDescriptor, base: &CommandSpec) -> Vec<(RunStage, CommandSpec)> {
    let excess = descriptor.overrides.contains_key(&ParamKey::ExcessTarget);
    let mut stages = vec![(RunStage::GenerateDelays, generate_spec(base))];
    for model in SolveModel::ALL {
        stages.push((RunStage::Train(model), training_spec(base, model)));
    }
    stages.push((RunStage::Test, test_spec(base, excess)));

    // Expected-excess sweeps repeat training and test with the excess
    // objective switched on, reusing the same scenario set.
    if excess {
        let mut excess_base = base.clone();
        excess_base.set(ParamKey::ExpectedExcess, ParamValue::text("y"));
        for model in SolveModel::ALL {
            stages.push((RunStage::TrainExcess(model), training_spec(&excess_base, model)));
        }
        stages.push((RunStage::TestExcess, test_spec(&excess_base, true)));
    }
    stages
}

fn expand_time(descriptor: &RunDescriptor, base: &CommandSpec) -> Vec<(RunStage, CommandSpec)> {
    let mut stages = Vec::new();
    if descriptor.fresh_scenarios {
        // Scenario generation must not carry the swept solve flag; the same
        // delay files serve every value in this repeat.
        let mut generate = generate_spec(base);
        generate.unset(descriptor.sweep_key);
        if descriptor.sweep_key == ParamKey::Parallel {
            // The default thread count still applies while generating.
            generate.set(ParamKey::Parallel, ParamValue::text("30"));
        }
        stages.push((RunStage::GenerateDelays, generate));
    }

    let mut solve = base.clone();
    solve.set(ParamKey::Model, ParamValue::text("benders"));
    solve.set(ParamKey::ParseDelays, ParamValue::Switch);
    stages.push((RunStage::Solve, solve));
    stages
}
