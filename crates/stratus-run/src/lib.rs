//! External-solver execution and artifact collection for stratus.

mod artifacts;
mod executor;

pub use artifacts::{collect, parse_run_dir_name, ArtifactSet};
pub use executor::{
    ensure_dir, execute_batch, guess_native_lib_path, purge_delay_files, SolverEnv,
    TRACE_LOG_NAME,
};
