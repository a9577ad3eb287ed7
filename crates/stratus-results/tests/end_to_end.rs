//! Full pipeline test against a stub solver executable.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use stratus_core::ExperimentClass;
use stratus_results::{collect_solution_records, ResultTable};
use stratus_run::{execute_batch, purge_delay_files, SolverEnv};
use stratus_sweep::plan_sweep;

/// Shell stub standing in for the solver. It understands just enough of the
/// argument contract to leave believable artifacts behind: delay files on
/// generation calls, summaries on training/test calls.
const STUB: &str = r#"#!/bin/sh
out=""; name=""; frac=""; phase=""; generate=0
prev=""
for arg in "$@"; do
  case "$prev" in
    -out) out="$arg";;
    -x) name="$arg";;
    -r) frac="$arg";;
    -type) phase="$arg";;
  esac
  if [ "$arg" = "-generateDelays" ]; then generate=1; fi
  prev="$arg"
done
if [ "$generate" = "1" ]; then
  touch "$out/../primary_delay_0.csv"
  exit 0
fi
if [ "$phase" = "training" ]; then
  printf 'instance: s1\nbudget fraction: %s\nrescheduleCost: 1000.5\n' "$frac" \
    > "$out/${name}_training_summary.yaml"
fi
if [ "$phase" = "test" ]; then
  printf 'approach,budget fraction,delayCost\nbenders,%s,410.25\n' "$frac" \
    > "$out/${name}_test_summary.csv"
fi
exit 0
"#;

fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("solver_stub.sh");
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn env_for(root: &Path, launcher: PathBuf) -> SolverEnv {
    let jar = root.join("solver.jar");
    fs::write(&jar, "jar").unwrap();
    SolverEnv {
        launcher,
        jar_path: jar,
        native_lib_path: root.to_path_buf(),
        solution_dir: root.join("solution"),
        logs_dir: root.join("logs"),
    }
}

#[test]
fn budget_sweep_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = write_stub(tmp.path(), STUB);
    let env = env_for(tmp.path(), launcher);
    env.validate().unwrap();

    let descriptors = plan_sweep(ExperimentClass::Budget, &["s1".to_string()]);
    assert_eq!(descriptors.len(), 5);

    execute_batch(&env, ExperimentClass::Budget, &descriptors, tmp.path()).unwrap();

    for id in 0..5 {
        assert!(env.solution_dir.join(format!("solution_budget_{id}")).is_dir());
    }
    // The generation stage left shared delay data behind.
    assert!(env.solution_dir.join("primary_delay_0.csv").is_file());

    let records = collect_solution_records(&env.solution_dir).unwrap();
    let table = ResultTable::from_records(&records).unwrap();
    assert_eq!(table.rows.len(), 5);

    let column = table
        .columns
        .iter()
        .position(|c| c == "test_budget fraction")
        .expect("budget fraction column");
    let fractions: Vec<&str> = table.rows.iter().map(|row| row[column].as_str()).collect();
    assert_eq!(fractions, ["0.25", "0.5", "0.75", "1", "2"]);

    // Between unrelated sweeps the shared delay data is purged.
    let removed = purge_delay_files(&env.solution_dir).unwrap();
    assert_eq!(removed, 1);
    assert!(!env.solution_dir.join("primary_delay_0.csv").exists());
}

#[test]
fn nonzero_exit_aborts_the_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = write_stub(tmp.path(), "#!/bin/sh\nexit 3\n");
    let env = env_for(tmp.path(), launcher);
    env.validate().unwrap();

    let descriptors = plan_sweep(ExperimentClass::Budget, &["s1".to_string()]);
    let err = execute_batch(&env, ExperimentClass::Budget, &descriptors, tmp.path()).unwrap_err();
    assert_eq!(err.info().code, "solver-exit");
    assert!(err.aborts_batch());

    // Only the first run directory was ever created.
    let dirs: Vec<_> = fs::read_dir(&env.solution_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    assert_eq!(dirs.len(), 1);
}
