//! Structured error types shared across stratus crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HarnessError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, run ids, offending lines).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the operator resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the harness.
///
/// The four families map onto the batch lifecycle: precondition and run
/// failures abort the remaining batch, artifact failures abort collection for
/// a single run, parse failures abort one result-collection pass. None of
/// them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HarnessError {
    /// Setup validation failed before any run started.
    #[error("precondition error: {0}")]
    Precondition(ErrorInfo),
    /// The external solver process failed or could not be launched.
    #[error("run error: {0}")]
    Run(ErrorInfo),
    /// An expected output artifact is missing or ambiguous.
    #[error("artifact error: {0}")]
    Artifact(ErrorInfo),
    /// A summary document or trace log could not be interpreted.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HarnessError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HarnessError::Precondition(info)
            | HarnessError::Run(info)
            | HarnessError::Artifact(info)
            | HarnessError::Parse(info) => info,
        }
    }

    /// True when the failure must abort the remaining batch.
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            HarnessError::Precondition(_) | HarnessError::Run(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_hint() {
        let err = HarnessError::Artifact(
            ErrorInfo::new("artifact-ambiguous", "two training summaries found")
                .with_context("dir", "solution_budget_3")
                .with_hint("remove stale files before collecting"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("artifact-ambiguous"));
        assert!(rendered.contains("dir=solution_budget_3"));
        assert!(rendered.contains("remove stale files"));
    }

    #[test]
    fn abort_policy_per_family() {
        let info = ErrorInfo::new("x", "y");
        assert!(HarnessError::Precondition(info.clone()).aborts_batch());
        assert!(HarnessError::Run(info.clone()).aborts_batch());
        assert!(!HarnessError::Artifact(info.clone()).aborts_batch());
        assert!(!HarnessError::Parse(info).aborts_batch());
    }
}
