use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use stratus_core::{ErrorInfo, HarnessError};
use stratus_run::guess_native_lib_path;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Path to the solver uberjar.
    #[arg(long, default_value = "build/libs/stochastic_uber.jar")]
    pub jar: PathBuf,
    /// Native library directory; guessed from gradle.properties when absent.
    #[arg(long = "lib-path")]
    pub lib_path: Option<PathBuf>,
    /// Shared output location for run directories.
    #[arg(long, default_value = "solution")]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(args: &DoctorArgs) -> Result<(), HarnessError> {
    let mut checks = Vec::new();

    checks.push(check(
        "solver jar",
        args.jar.is_file(),
        args.jar.display().to_string(),
    ));

    match args.lib_path.clone().map(Ok).unwrap_or_else(guess_native_lib_path) {
        Ok(path) => checks.push(check(
            "native library path",
            path.is_dir(),
            path.display().to_string(),
        )),
        Err(err) => checks.push(check("native library path", false, err.to_string())),
    }

    checks.push(check(
        "solution directory clean",
        solution_dir_clean(&args.out),
        args.out.display().to_string(),
    ));

    let ok = checks.iter().all(|c| c.ok);
    let report = DoctorReport {
        status: if ok { "ok" } else { "failed" }.to_string(),
        checks,
    };
    let rendered = serde_json::to_string_pretty(&report).map_err(|err| {
        HarnessError::Parse(ErrorInfo::new("doctor-encode", err.to_string()))
    })?;
    println!("{rendered}");

    if !ok {
        return Err(HarnessError::Precondition(ErrorInfo::new(
            "doctor-failed",
            "one or more setup checks failed",
        )));
    }
    Ok(())
}

fn check(name: &str, ok: bool, detail: String) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        ok,
        detail,
    }
}

fn solution_dir_clean(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        // A missing directory is fine; the batch command creates it.
        Err(_) => !path.exists(),
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .all(|entry| entry.file_name() == ".gitkeep"),
    }
}
