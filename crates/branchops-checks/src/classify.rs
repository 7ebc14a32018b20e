//! Output classification strategies.
//!
//! Tool reports are free-form text whose format is not stable across
//! versions, so classification leans on exit status first and known success
//! phrases second. Anything ambiguous is a failure, never a pass.

use crate::gate::CheckOutcome;

/// Per-tool rule for turning raw output into pass/fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputClassifier {
    /// Pass on exit zero, fail otherwise.
    ExitStatus,

    /// Pass only on exit zero *and* one of the success phrases appearing in
    /// the report (matched case-insensitively). A clean exit without a
    /// recognizable phrase is treated as a failure.
    SuccessMarker { markers: Vec<&'static str> },
}

impl OutputClassifier {
    /// Classify a completed invocation. Any nonzero exit fails regardless of
    /// what the report says.
    pub fn classify(&self, exit_code: i32, stdout: &str, stderr: &str) -> CheckOutcome {
        if exit_code != 0 {
            return CheckOutcome::Failed;
        }

        match self {
            OutputClassifier::ExitStatus => CheckOutcome::Passed,
            OutputClassifier::SuccessMarker { markers } => {
                let report = format!("{stdout}\n{stderr}").to_lowercase();
                if markers.iter().any(|m| report.contains(&m.to_lowercase())) {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed
                }
            }
        }
    }
}

/// The line worth echoing on success: the one carrying the marker, else the
/// last non-empty line of the report.
pub fn summary_line(stdout: &str, markers: &[&str]) -> String {
    let lower_markers: Vec<String> = markers.iter().map(|m| m.to_lowercase()).collect();
    let mut last = "";
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        if lower_markers.iter().any(|m| lower.contains(m)) {
            return line.to_string();
        }
        last = line;
    }
    last.to_string()
}

/// The excerpt worth surfacing on failure: trimmed stdout, falling back to
/// stderr, capped to the last `max_lines` lines.
pub fn failure_excerpt(stdout: &str, stderr: &str, max_lines: usize) -> String {
    let source = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };
    let lines: Vec<&str> = source
        .lines()
        .map(str::trim_end)
        .skip_while(|l| l.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n").trim().to_string()
}
