//! Sweep enumeration: experiment class + instances -> ordered run descriptors.

use std::collections::BTreeMap;

use stratus_core::{ExperimentClass, ParamKey, ParamValue, RunDescriptor};
use tracing::warn;

/// Number of repeats for time-comparison-shaped sweeps. Each repeat runs
/// under freshly generated scenario data to capture runtime variance.
pub const TIME_REPEATS: u32 = 5;

/// Enumeration shape of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepShape {
    /// One descriptor per (instance, axis value); full training/test stages.
    Quality,
    /// Axis values repeated [`TIME_REPEATS`] times per instance; one solve
    /// invocation per descriptor, scenario data shared within a repeat.
    Time,
}

pub fn shape(class: ExperimentClass) -> SweepShape {
    match class {
        ExperimentClass::Budget
        | ExperimentClass::Mean
        | ExperimentClass::Quality
        | ExperimentClass::Scenario
        | ExperimentClass::ExpectedExcess => SweepShape::Quality,
        ExperimentClass::ColumnCaching
        | ExperimentClass::Parallel
        | ExperimentClass::TimeComparison
        | ExperimentClass::CutComparison => SweepShape::Time,
    }
}

fn repeats(class: ExperimentClass) -> u32 {
    match shape(class) {
        SweepShape::Quality => 1,
        SweepShape::Time => TIME_REPEATS,
    }
}

/// One value on a sweep axis, with the overrides it pins on the command.
struct AxisPoint {
    label: String,
    overrides: BTreeMap<ParamKey, ParamValue>,
}

impl AxisPoint {
    fn single(key: ParamKey, token: &str) -> Self {
        let mut overrides = BTreeMap::new();
        overrides.insert(key, ParamValue::text(token));
        AxisPoint {
            label: token.to_string(),
            overrides,
        }
    }
}

fn axis_points(class: ExperimentClass) -> (ParamKey, Vec<AxisPoint>) {
    match class {
        ExperimentClass::Budget => {
            let key = ParamKey::BudgetFraction;
            let points = ["0.25", "0.5", "0.75", "1", "2"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::Mean => {
            let key = ParamKey::Mean;
            let points = ["15", "30", "45", "60"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::Quality => {
            let key = ParamKey::FlightPick;
            let points = ["hub", "rush"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::Scenario => {
            let key = ParamKey::NumScenarios;
            let points = ["10", "20", "30", "40", "50"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::ExpectedExcess => {
            let key = ParamKey::StandardDeviation;
            let mut points = Vec::new();
            for sd in ["30.0", "45.0", "60.0"] {
                for target in ["2500", "5000"] {
                    let mut overrides = BTreeMap::new();
                    overrides.insert(ParamKey::Mean, ParamValue::text("30"));
                    overrides.insert(key, ParamValue::text(sd));
                    overrides.insert(ParamKey::ExcessTarget, ParamValue::text(target));
                    overrides.insert(ParamKey::ExcessAversion, ParamValue::text("10"));
                    points.push(AxisPoint {
                        label: format!("{sd}/{target}"),
                        overrides,
                    });
                }
            }
            (key, points)
        }
        ExperimentClass::ColumnCaching => {
            let key = ParamKey::Cache;
            let points = ["y", "n"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::Parallel => {
            let key = ParamKey::Parallel;
            let points = ["1", "10", "20", "30"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::TimeComparison => {
            let key = ParamKey::ColumnGen;
            let points = ["enum", "all", "best", "first"]
                .iter()
                .map(|v| AxisPoint::single(key, v))
                .collect();
            (key, points)
        }
        ExperimentClass::CutComparison => {
            let key = ParamKey::SingleCut;
            let multi = AxisPoint {
                label: "multi".to_string(),
                overrides: BTreeMap::new(),
            };
            let mut single_overrides = BTreeMap::new();
            single_overrides.insert(key, ParamValue::Switch);
            let single = AxisPoint {
                label: "single".to_string(),
                overrides: single_overrides,
            };
            (key, vec![multi, single])
        }
    }
}

/// Enumerates the full ordered descriptor list for one sweep.
///
/// Ordering is instance -> repeat -> axis value; run ids are assigned
/// monotonically from zero in that order. An empty instance list produces an
/// empty plan and a warning, never an error.
pub fn plan_sweep(class: ExperimentClass, instances: &[String]) -> Vec<RunDescriptor> {
    if instances.is_empty() {
        warn!(class = class.label(), "no instances given, planning nothing");
        return Vec::new();
    }

    let (sweep_key, points) = axis_points(class);
    let sweep_shape = shape(class);
    let mut descriptors = Vec::new();
    let mut run_id = 0u64;
    for instance in instances {
        for repeat in 0..repeats(class) {
            for (idx, point) in points.iter().enumerate() {
                descriptors.push(RunDescriptor {
                    class,
                    instance: instance.clone(),
                    sweep_key,
                    sweep_label: point.label.clone(),
                    overrides: point.overrides.clone(),
                    repeat,
                    run_id,
                    // Quality runs always generate their own scenarios; time
                    // runs generate once per repeat and reuse across values.
                    fresh_scenarios: sweep_shape == SweepShape::Quality || idx == 0,
                });
                run_id += 1;
            }
        }
    }
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn budget_sweep_count() {
        let plan = plan_sweep(ExperimentClass::Budget, &names(3));
        assert_eq!(plan.len(), 5 * 3);
    }

    #[test]
    fn time_comparison_sweep_count() {
        let plan = plan_sweep(ExperimentClass::TimeComparison, &names(2));
        assert_eq!(plan.len(), 4 * TIME_REPEATS as usize * 2);
    }

    #[test]
    fn expected_excess_grid_count() {
        let plan = plan_sweep(ExperimentClass::ExpectedExcess, &names(1));
        assert_eq!(plan.len(), 3 * 2);
    }

    #[test]
    fn empty_instances_yield_empty_plan() {
        assert!(plan_sweep(ExperimentClass::Budget, &[]).is_empty());
    }

    #[test]
    fn run_ids_are_monotonic_and_unique() {
        let plan = plan_sweep(ExperimentClass::Parallel, &names(2));
        for (idx, descriptor) in plan.iter().enumerate() {
            assert_eq!(descriptor.run_id, idx as u64);
        }
    }

    #[test]
    fn scenario_data_is_fresh_once_per_repeat() {
        let plan = plan_sweep(ExperimentClass::Parallel, &names(1));
        let fresh: Vec<bool> = plan.iter().map(|d| d.fresh_scenarios).collect();
        // 4 thread counts per repeat, 5 repeats.
        let expected: Vec<bool> = (0..5)
            .flat_map(|_| [true, false, false, false])
            .collect();
        assert_eq!(fresh, expected);
    }

    #[test]
    fn quality_runs_always_regenerate() {
        let plan = plan_sweep(ExperimentClass::Mean, &names(1));
        assert!(plan.iter().all(|d| d.fresh_scenarios));
    }
}
