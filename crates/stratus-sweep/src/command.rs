//! Deterministic construction of solver invocations.
//!
//! The merge rule is fixed: class defaults first, then the descriptor's
//! overrides, then secondary effects triggered by the swept axis. Defaults
//! are an immutable value handed in per run; nothing here mutates shared
//! state between runs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stratus_core::{ExperimentClass, ParamKey, ParamValue, RunDescriptor};

use crate::plan::{shape, SweepShape};

/// Ordered flag/value association for one solver invocation.
///
/// Flags are stored keyed by [`ParamKey`], whose ordering fixes the argv
/// emission order, so identical contents always render byte-identical argv.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandSpec {
    values: BTreeMap<ParamKey, ParamValue>,
}

impl CommandSpec {
    pub fn new(values: BTreeMap<ParamKey, ParamValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: ParamKey) -> Option<&ParamValue> {
        self.values.get(&key)
    }

    pub fn set(&mut self, key: ParamKey, value: ParamValue) {
        self.values.insert(key, value);
    }

    pub fn unset(&mut self, key: ParamKey) {
        self.values.remove(&key);
    }

    /// Renders the flag/value pairs in canonical order.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.values.len() * 2);
        for (key, value) in &self.values {
            argv.push(key.flag().to_string());
            if let Some(token) = value.render() {
                argv.push(token);
            }
        }
        argv
    }
}

/// Baseline parameter map for an experiment class.
///
/// Every sweep holds these fixed except for its own axis: log-normal delays
/// with mean 30 and standard deviation 15, half the reschedule budget, the
/// first-column generation strategy, and 30 solver threads.
pub fn class_defaults(class: ExperimentClass, data_path: &Path) -> BTreeMap<ParamKey, ParamValue> {
    let mut defaults = BTreeMap::new();
    defaults.insert(ParamKey::Batch, ParamValue::Switch);
    defaults.insert(
        ParamKey::Path,
        ParamValue::text(data_path.to_string_lossy()),
    );
    defaults.insert(ParamKey::Distribution, ParamValue::text("lnorm"));
    defaults.insert(ParamKey::Mean, ParamValue::text("30"));
    defaults.insert(ParamKey::StandardDeviation, ParamValue::text("15"));
    defaults.insert(ParamKey::BudgetFraction, ParamValue::text("0.5"));
    defaults.insert(ParamKey::ColumnGen, ParamValue::text("first"));
    defaults.insert(ParamKey::Parallel, ParamValue::text("30"));
    if shape(class) == SweepShape::Time {
        defaults.insert(ParamKey::Phase, ParamValue::text("benders"));
    }
    defaults
}

/// Merges defaults and descriptor overrides into a [`CommandSpec`].
pub fn build_command(
    descriptor: &RunDescriptor,
    defaults: &BTreeMap<ParamKey, ParamValue>,
) -> CommandSpec {
    let mut spec = CommandSpec::new(defaults.clone());
    spec.set(ParamKey::Name, ParamValue::text(&descriptor.instance));
    for (key, value) in &descriptor.overrides {
        spec.set(*key, value.clone());
    }

    // Secondary effects keep comparisons controlled: mean sweeps hold the
    // distribution shape fixed at exponential, and caching/cut sweeps remove
    // thread count as a confound.
    match descriptor.sweep_key {
        ParamKey::Mean => spec.set(ParamKey::Distribution, ParamValue::text("exp")),
        ParamKey::Cache | ParamKey::SingleCut => {
            spec.set(ParamKey::Parallel, ParamValue::text("1"))
        }
        _ => {}
    }

    spec
}
