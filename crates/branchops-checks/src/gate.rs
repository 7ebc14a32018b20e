//! Check results and aggregate pipeline verdict.

use serde::{Deserialize, Serialize};

/// Verdict for a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The check's skip rule fired; the tool was never invoked.
    Skipped,
    Passed,
    Failed,
}

/// Outcome of one check, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub outcome: CheckOutcome,
    pub message: String,
}

impl CheckResult {
    pub fn skipped(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: CheckOutcome::Skipped,
            message: reason.to_string(),
        }
    }

    pub fn passed(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: CheckOutcome::Passed,
            message: message.to_string(),
        }
    }

    pub fn failed(name: &str, excerpt: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: CheckOutcome::Failed,
            message: excerpt.to_string(),
        }
    }
}

/// Aggregate result of a pipeline run. The pipeline halts at the first
/// failure, so `results` ends with the failing check when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub results: Vec<CheckResult>,
    pub success: bool,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == CheckOutcome::Passed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == CheckOutcome::Skipped)
            .count()
    }

    /// The failing check, when the pipeline was aborted.
    pub fn failure(&self) -> Option<&CheckResult> {
        self.results
            .iter()
            .find(|r| r.outcome == CheckOutcome::Failed)
    }
}
