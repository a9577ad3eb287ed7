//! Experiment classes and per-run descriptors.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, HarnessError};
use crate::params::{ParamKey, ParamValue};

/// Named sweep families supported by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentClass {
    Budget,
    Mean,
    Quality,
    Scenario,
    ExpectedExcess,
    ColumnCaching,
    Parallel,
    TimeComparison,
    CutComparison,
}

impl ExperimentClass {
    pub const ALL: [ExperimentClass; 9] = [
        ExperimentClass::Budget,
        ExperimentClass::Mean,
        ExperimentClass::Quality,
        ExperimentClass::Scenario,
        ExperimentClass::ExpectedExcess,
        ExperimentClass::ColumnCaching,
        ExperimentClass::Parallel,
        ExperimentClass::TimeComparison,
        ExperimentClass::CutComparison,
    ];

    /// Short label used in output-directory names and result tables.
    pub fn label(&self) -> &'static str {
        match self {
            ExperimentClass::Budget => "budget",
            ExperimentClass::Mean => "mean",
            ExperimentClass::Quality => "quality",
            ExperimentClass::Scenario => "scenario",
            ExperimentClass::ExpectedExcess => "excess",
            ExperimentClass::ColumnCaching => "caching",
            ExperimentClass::Parallel => "thread",
            ExperimentClass::TimeComparison => "column",
            ExperimentClass::CutComparison => "cut",
        }
    }
}

impl Display for ExperimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExperimentClass {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperimentClass::ALL
            .iter()
            .copied()
            .find(|class| class.label() == s)
            .ok_or_else(|| {
                HarnessError::Precondition(
                    ErrorInfo::new("experiment-class-unknown", "unrecognized experiment class")
                        .with_context("name", s)
                        .with_hint("known classes: budget, mean, quality, scenario, excess, caching, thread, column, cut"),
                )
            })
    }
}

/// One point in a sweep: a specific instance, parameter value, and repeat.
///
/// `overrides` holds the swept value plus any companion values the class
/// pins alongside it; `sweep_key` identifies the axis so the command builder
/// can apply secondary effects. `fresh_scenarios` marks descriptors that must
/// regenerate scenario-delay data before solving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescriptor {
    pub class: ExperimentClass,
    pub instance: String,
    pub sweep_key: ParamKey,
    pub sweep_label: String,
    pub overrides: BTreeMap<ParamKey, ParamValue>,
    pub repeat: u32,
    pub run_id: u64,
    pub fresh_scenarios: bool,
}

impl RunDescriptor {
    /// Deterministic output-directory name for this run.
    pub fn dir_name(&self) -> String {
        format!("solution_{}_{}", self.class.label(), self.run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_labels_round_trip() {
        for class in ExperimentClass::ALL {
            assert_eq!(class.label().parse::<ExperimentClass>().unwrap(), class);
        }
    }

    #[test]
    fn unknown_class_is_rejected() {
        let err = "warp".parse::<ExperimentClass>().unwrap_err();
        assert!(matches!(err, HarnessError::Precondition(_)));
    }

    #[test]
    fn dir_name_is_deterministic() {
        let descriptor = RunDescriptor {
            class: ExperimentClass::Budget,
            instance: "s1".into(),
            sweep_key: ParamKey::BudgetFraction,
            sweep_label: "0.25".into(),
            overrides: BTreeMap::new(),
            repeat: 0,
            run_id: 7,
            fresh_scenarios: true,
        };
        assert_eq!(descriptor.dir_name(), "solution_budget_7");
    }
}
