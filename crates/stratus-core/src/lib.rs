//! Shared types for the stratus experiment-orchestration harness.

pub mod errors;
pub mod experiment;
pub mod params;

pub use errors::{ErrorInfo, HarnessError};
pub use experiment::{ExperimentClass, RunDescriptor};
pub use params::{ParamKey, ParamValue};
