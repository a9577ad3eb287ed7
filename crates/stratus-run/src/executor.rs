//! Synchronous execution of the external solver.
//!
//! Runs are strictly sequential: each solver call blocks until exit, and a
//! nonzero exit aborts the remaining batch because later stages consume
//! delay files written by earlier ones. There is no timeout and no retry; a
//! hung solver blocks the batch until killed externally, which then surfaces
//! as a run failure.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use stratus_core::{ErrorInfo, ExperimentClass, HarnessError, ParamKey, ParamValue, RunDescriptor};
use stratus_sweep::{build_command, class_defaults, expand_stages, CommandSpec};
use tracing::{info, warn};

const HEAP_MIN: &str = "-Xms32m";
const HEAP_MAX: &str = "-Xmx32g";

/// Name of the per-run trace log the harness captures solver output into.
pub const TRACE_LOG_NAME: &str = "solver.log";

/// Everything needed to launch the solver.
#[derive(Debug, Clone)]
pub struct SolverEnv {
    /// Runtime binary, normally `java`. Overridable so tests can substitute
    /// a stub executable.
    pub launcher: PathBuf,
    /// Path to the solver uberjar.
    pub jar_path: PathBuf,
    /// Directory holding the optimizer's native libraries.
    pub native_lib_path: PathBuf,
    /// Shared output location; one subdirectory is created per run.
    pub solution_dir: PathBuf,
    /// Directory for harness-side log files.
    pub logs_dir: PathBuf,
}

impl SolverEnv {
    /// Validates every precondition before the first run starts.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if !self.jar_path.is_file() {
            return Err(HarnessError::Precondition(
                ErrorInfo::new("solver-jar-missing", "unable to find solver uberjar")
                    .with_context("path", self.jar_path.display().to_string()),
            ));
        }
        info!("located solver uberjar");

        if !self.native_lib_path.is_dir() {
            return Err(HarnessError::Precondition(
                ErrorInfo::new("native-lib-invalid", "native library path is not a directory")
                    .with_context("path", self.native_lib_path.display().to_string()),
            ));
        }
        info!("located native library path");

        ensure_dir(&self.logs_dir)?;
        ensure_dir(&self.solution_dir)?;
        for entry in read_dir_sorted(&self.solution_dir)? {
            if entry != ".gitkeep" {
                return Err(HarnessError::Precondition(
                    ErrorInfo::new("solution-dir-dirty", "solution directory not empty")
                        .with_context("entry", entry)
                        .with_hint("move or delete leftover run output before starting a batch"),
                ));
            }
        }
        info!("created/checked solution directory");
        Ok(())
    }

    /// Full argv for one solver call: fixed runtime prefix plus the
    /// command's own flags.
    pub fn invocation(&self, spec: &CommandSpec) -> Vec<String> {
        let mut argv = vec![
            self.launcher.to_string_lossy().to_string(),
            HEAP_MIN.to_string(),
            HEAP_MAX.to_string(),
            format!("-Djava.library.path={}", self.native_lib_path.display()),
            "-jar".to_string(),
            self.jar_path.to_string_lossy().to_string(),
        ];
        argv.extend(spec.to_argv());
        argv
    }
}

/// Creates a directory if needed; an existing directory is never an error.
pub fn ensure_dir(path: &Path) -> Result<(), HarnessError> {
    fs::create_dir_all(path).map_err(|err| {
        HarnessError::Precondition(
            ErrorInfo::new("dir-create", "failed to create directory")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

fn read_dir_sorted(path: &Path) -> Result<Vec<String>, HarnessError> {
    let mut names = Vec::new();
    let entries = fs::read_dir(path).map_err(|err| {
        HarnessError::Precondition(
            ErrorInfo::new("dir-read", "failed to read directory")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| {
            HarnessError::Precondition(ErrorInfo::new("dir-read", err.to_string()))
        })?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

/// Removes residual scenario-delay files from the shared output location.
///
/// Called between unrelated sweeps so one sweep's stale delay data cannot
/// leak into the next. Must never run within a sweep: the files are shared
/// intentionally across that sweep's training and test stages.
pub fn purge_delay_files(dir: &Path) -> Result<usize, HarnessError> {
    let mut removed = 0;
    for name in read_dir_sorted(dir)? {
        if name.ends_with(".csv")
            && (name.starts_with("primary_delay") || name.starts_with("reschedule_"))
        {
            fs::remove_file(dir.join(&name)).map_err(|err| {
                HarnessError::Run(
                    ErrorInfo::new("delay-purge", "failed to remove delay file")
                        .with_context("file", name.clone())
                        .with_hint(err.to_string()),
                )
            })?;
            removed += 1;
        }
    }
    if removed > 0 {
        info!(removed, dir = %dir.display(), "purged residual delay files");
    }
    Ok(removed)
}

/// Executes every descriptor of one sweep in declared order.
///
/// Each descriptor's stages run back to back against its own output
/// directory; the first nonzero exit aborts the remainder of the batch.
pub fn execute_batch(
    env: &SolverEnv,
    class: ExperimentClass,
    descriptors: &[RunDescriptor],
    data_path: &Path,
) -> Result<(), HarnessError> {
    if descriptors.is_empty() {
        warn!(class = class.label(), "nothing to execute");
        return Ok(());
    }

    let defaults = class_defaults(class, data_path);
    info!(class = class.label(), runs = descriptors.len(), "starting sweep");
    for descriptor in descriptors {
        let run_dir = env.solution_dir.join(descriptor.dir_name());
        ensure_dir(&run_dir)?;

        let base = build_command(descriptor, &defaults);
        for (stage, mut spec) in expand_stages(descriptor, &base) {
            spec.set(
                ParamKey::OutputPath,
                ParamValue::text(run_dir.to_string_lossy()),
            );
            spec.set(
                ParamKey::OutputName,
                ParamValue::text(format!("{}_{}", class.label(), descriptor.run_id)),
            );
            run_stage(env, descriptor, &run_dir, &spec)?;
            info!(
                class = class.label(),
                run_id = descriptor.run_id,
                stage = ?stage,
                "finished stage"
            );
        }
        info!(
            class = class.label(),
            run_id = descriptor.run_id,
            instance = %descriptor.instance,
            value = %descriptor.sweep_label,
            "finished run"
        );
    }
    info!(class = class.label(), "completed sweep");
    Ok(())
}

fn run_stage(
    env: &SolverEnv,
    descriptor: &RunDescriptor,
    run_dir: &Path,
    spec: &CommandSpec,
) -> Result<(), HarnessError> {
    let argv = env.invocation(spec);
    let command_line = format!("command: {}", argv.join(" "));
    info!("{command_line}");

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .output()
        .map_err(|err| {
            HarnessError::Run(
                ErrorInfo::new("solver-spawn", "failed to launch solver process")
                    .with_context("launcher", argv[0].clone())
                    .with_hint(err.to_string()),
            )
        })?;

    append_trace_log(run_dir, &command_line, &output.stdout, &output.stderr)?;

    if !output.status.success() {
        return Err(HarnessError::Run(
            ErrorInfo::new("solver-exit", "solver process exited with failure")
                .with_context("status", output.status.to_string())
                .with_context("run_id", descriptor.run_id.to_string())
                .with_context("instance", descriptor.instance.clone())
                .with_hint("aborting remaining batch; later runs depend on earlier artifacts"),
        ));
    }
    Ok(())
}

// The invocation line goes in first so result collection can recover run
// metadata from the trace log alone.
fn append_trace_log(
    run_dir: &Path,
    command_line: &str,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<(), HarnessError> {
    let log_path = run_dir.join(TRACE_LOG_NAME);
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log_path)
        .map_err(|err| {
            HarnessError::Run(
                ErrorInfo::new("trace-log-open", "failed to open trace log")
                    .with_context("path", log_path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
    let write = |file: &mut fs::File, bytes: &[u8]| -> std::io::Result<()> {
        file.write_all(bytes)?;
        if !bytes.is_empty() && !bytes.ends_with(b"\n") {
            file.write_all(b"\n")?;
        }
        Ok(())
    };
    write(&mut file, command_line.as_bytes())
        .and_then(|_| write(&mut file, stdout))
        .and_then(|_| write(&mut file, stderr))
        .map_err(|err| {
            HarnessError::Run(
                ErrorInfo::new("trace-log-write", "failed to append to trace log")
                    .with_context("path", log_path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })
}

/// Reads the optimizer's native library path from the user's gradle
/// properties, mirroring how the solver's own build locates it.
pub fn guess_native_lib_path() -> Result<PathBuf, HarnessError> {
    let home = std::env::var("HOME").map_err(|_| {
        HarnessError::Precondition(ErrorInfo::new(
            "home-unset",
            "HOME is not set, cannot locate gradle.properties",
        ))
    })?;
    let props = Path::new(&home).join(".gradle").join("gradle.properties");
    let text = fs::read_to_string(&props).map_err(|err| {
        HarnessError::Precondition(
            ErrorInfo::new("gradle-properties-missing", "unable to read gradle.properties")
                .with_context("path", props.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("cplexLibPath=") {
            return Ok(PathBuf::from(value.trim()));
        }
    }
    Err(HarnessError::Precondition(
        ErrorInfo::new("native-lib-unknown", "cplexLibPath not found in gradle.properties")
            .with_context("path", props.display().to_string())
            .with_hint("pass the library path explicitly with --lib-path"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use stratus_sweep::CommandSpec;

    fn spec() -> CommandSpec {
        let mut values = BTreeMap::new();
        values.insert(ParamKey::Batch, ParamValue::Switch);
        values.insert(ParamKey::Name, ParamValue::text("s1"));
        CommandSpec::new(values)
    }

    #[test]
    fn invocation_prefix_is_fixed() {
        let env = SolverEnv {
            launcher: PathBuf::from("java"),
            jar_path: PathBuf::from("build/libs/solver.jar"),
            native_lib_path: PathBuf::from("/opt/cplex/bin"),
            solution_dir: PathBuf::from("solution"),
            logs_dir: PathBuf::from("logs"),
        };
        let argv = env.invocation(&spec());
        assert_eq!(
            &argv[..6],
            &[
                "java",
                "-Xms32m",
                "-Xmx32g",
                "-Djava.library.path=/opt/cplex/bin",
                "-jar",
                "build/libs/solver.jar"
            ]
        );
        assert_eq!(&argv[6..], &["-batch", "-name", "s1"]);
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("solution_budget_0");
        ensure_dir(&dir).unwrap();
        std::fs::write(dir.join("marker.txt"), "x").unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.join("marker.txt").is_file());
    }

    #[test]
    fn purge_removes_only_delay_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        for name in [
            "primary_delay_0.csv",
            "primary_delay_1.csv",
            "reschedule_benders.csv",
            "s1_test_summary.csv",
            "primary_delay_notes.txt",
        ] {
            std::fs::write(dir.join(name), "x").unwrap();
        }
        let removed = purge_delay_files(dir).unwrap();
        assert_eq!(removed, 3);
        assert!(dir.join("s1_test_summary.csv").is_file());
        assert!(dir.join("primary_delay_notes.txt").is_file());
    }

    #[test]
    fn dirty_solution_dir_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("solver.jar");
        std::fs::write(&jar, "jar").unwrap();
        let solution = tmp.path().join("solution");
        std::fs::create_dir(&solution).unwrap();
        std::fs::write(solution.join("leftover.csv"), "x").unwrap();
        let env = SolverEnv {
            launcher: PathBuf::from("java"),
            jar_path: jar,
            native_lib_path: tmp.path().to_path_buf(),
            solution_dir: solution,
            logs_dir: tmp.path().join("logs"),
        };
        let err = env.validate().unwrap_err();
        assert_eq!(err.info().code, "solution-dir-dirty");
    }
}
