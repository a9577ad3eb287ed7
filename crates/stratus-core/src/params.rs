//! Typed schema for the solver's argument contract.
//!
//! The external solver accepts a fixed set of flags. Keeping the set closed
//! in an enum means a typo'd flag name is a compile error instead of a
//! silently malformed invocation, and the enum's declaration order gives one
//! canonical argv order for every invocation.

use serde::{Deserialize, Serialize};

/// Recognized solver flags, in canonical argv emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    /// Batch-mode switch, always present on harness invocations.
    Batch,
    /// Directory holding instance schedule files.
    Path,
    /// Instance name within the data directory.
    Name,
    /// Run phase selector (training/test/benders).
    Phase,
    /// Model to solve (naive/dep/benders).
    Model,
    /// Primary delay distribution (exp/tnorm/lnorm).
    Distribution,
    /// Distribution mean in minutes.
    Mean,
    /// Distribution standard deviation in minutes.
    StandardDeviation,
    /// Reschedule budget fraction.
    BudgetFraction,
    /// Flight selection strategy (all/hub/rush).
    FlightPick,
    /// Column generation strategy (enum/all/best/first).
    ColumnGen,
    /// Column caching toggle (y/n).
    Cache,
    /// Solver thread count.
    Parallel,
    /// Number of delay scenarios to generate.
    NumScenarios,
    /// Expected-excess objective toggle (y/n).
    ExpectedExcess,
    /// Expected-excess target.
    ExcessTarget,
    /// Expected-excess aversion multiplier.
    ExcessAversion,
    /// Single-cut Benders switch.
    SingleCut,
    /// Generate delay scenarios instead of solving.
    GenerateDelays,
    /// Reuse previously generated delay scenarios.
    ParseDelays,
    /// Output directory for run artifacts.
    OutputPath,
    /// Output name prefix for run artifacts.
    OutputName,
}

impl ParamKey {
    /// The literal flag string the solver expects.
    pub fn flag(&self) -> &'static str {
        match self {
            ParamKey::Batch => "-batch",
            ParamKey::Path => "-path",
            ParamKey::Name => "-name",
            ParamKey::Phase => "-type",
            ParamKey::Model => "-model",
            ParamKey::Distribution => "-d",
            ParamKey::Mean => "-mean",
            ParamKey::StandardDeviation => "-sd",
            ParamKey::BudgetFraction => "-r",
            ParamKey::FlightPick => "-f",
            ParamKey::ColumnGen => "-c",
            ParamKey::Cache => "-cache",
            ParamKey::Parallel => "-parallel",
            ParamKey::NumScenarios => "-numScenarios",
            ParamKey::ExpectedExcess => "-expectedExcess",
            ParamKey::ExcessTarget => "-excessTarget",
            ParamKey::ExcessAversion => "-excessAversion",
            ParamKey::SingleCut => "-s",
            ParamKey::GenerateDelays => "-generateDelays",
            ParamKey::ParseDelays => "-parseDelays",
            ParamKey::OutputPath => "-out",
            ParamKey::OutputName => "-x",
        }
    }
}

/// Value attached to a flag.
///
/// Text values keep the exact token handed to the solver (budget fractions
/// are written `1`, not `1.0`). `Switch` marks bare flags with no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Switch,
    Text(String),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }

    /// Renders the value token, or `None` for bare switches.
    pub fn render(&self) -> Option<String> {
        match self {
            ParamValue::Switch => None,
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Float(f) => Some(f.to_string()),
        }
    }

    /// Label used in run descriptors and reports; switches render empty.
    pub fn label(&self) -> String {
        self.render().unwrap_or_default()
    }
}
