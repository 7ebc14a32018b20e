//! Pipeline orchestration.
//!
//! Checks run sequentially in their configured order and the pipeline halts
//! at the first failure: later checks are never invoked, and the failing
//! check's excerpt is the last entry in the result list.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::check::CheckDefinition;
use crate::classify::{failure_excerpt, summary_line, OutputClassifier};
use crate::gate::{CheckOutcome, CheckResult, PipelineResult};
use crate::runner::CheckRunner;

/// Lines of tool output surfaced with a failure.
const MAX_EXCERPT_LINES: usize = 30;

/// Flag snapshot for one pipeline run. Built once from the CLI invocation
/// and never mutated; the skip rules read this, not process arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Run language-specific checks even when their partition is empty.
    pub force: bool,

    /// Skip every check.
    pub skip_all: bool,

    pub skip_rubocop: bool,
    pub skip_brakeman: bool,
    pub skip_rspec: bool,
    pub skip_lint: bool,
}

/// Quality-gate pipeline executor.
pub struct CheckPipeline;

impl CheckPipeline {
    /// Run the checks in order with fail-fast semantics.
    ///
    /// Skipped checks report [`CheckOutcome::Skipped`]; a run where every
    /// check was skipped is still an aggregate success. A check whose
    /// invocation itself errors (spawn failure, timeout) is a failure.
    pub async fn run(checks: Vec<CheckDefinition>, repo_root: &Path) -> PipelineResult {
        let start = Instant::now();
        let mut results = Vec::new();

        for check in &checks {
            if !check.enabled {
                info!(check = check.name, reason = check.skip_reason, "skipping check");
                results.push(CheckResult::skipped(check.name, check.skip_reason));
                continue;
            }

            info!(check = check.name, "running check");

            if let Some(result) = Self::try_fast_path(check, repo_root).await {
                results.push(result);
                continue;
            }

            let output = match CheckRunner::execute(
                &check.command,
                &check.env,
                repo_root,
                check.timeout_secs,
            )
            .await
            {
                Ok(output) => output,
                Err(e) => {
                    warn!(check = check.name, error = %e, "check invocation failed");
                    results.push(CheckResult::failed(check.name, &e.to_string()));
                    return Self::finish(results, start);
                }
            };

            match check
                .classifier
                .classify(output.exit_code, &output.stdout, &output.stderr)
            {
                CheckOutcome::Passed => {
                    let message = summary_line(&output.stdout, classifier_markers(&check.classifier));
                    results.push(CheckResult::passed(check.name, &message));
                }
                _ => {
                    let excerpt =
                        failure_excerpt(&output.stdout, &output.stderr, MAX_EXCERPT_LINES);
                    warn!(check = check.name, "check failed");
                    results.push(CheckResult::failed(check.name, &excerpt));
                    return Self::finish(results, start);
                }
            }
        }

        Self::finish(results, start)
    }

    /// Probe the fast path. `Some(Passed)` means the gate is satisfied
    /// without the main command; `None` falls through to it.
    async fn try_fast_path(check: &CheckDefinition, repo_root: &Path) -> Option<CheckResult> {
        let fast = check.fast_path.as_ref()?;
        let output = CheckRunner::execute(&fast.command, &check.env, repo_root, check.timeout_secs)
            .await
            .ok()?;

        let report = format!("{}\n{}", output.stdout, output.stderr).to_lowercase();
        if output.exit_code == 0 && report.contains(&fast.marker.to_lowercase()) {
            info!(check = check.name, "fast path satisfied");
            return Some(CheckResult::passed(check.name, fast.marker));
        }
        None
    }

    fn finish(results: Vec<CheckResult>, start: Instant) -> PipelineResult {
        let success = !results
            .iter()
            .any(|r| r.outcome == CheckOutcome::Failed);
        PipelineResult {
            results,
            success,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

fn classifier_markers(classifier: &OutputClassifier) -> &[&'static str] {
    match classifier {
        OutputClassifier::ExitStatus => &[],
        OutputClassifier::SuccessMarker { markers } => markers,
    }
}
