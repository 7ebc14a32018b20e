//! Push execution and advisory interpretation.
//!
//! Success is judged by exit status alone: a nonzero exit is a failed push,
//! full stop. The remote's vulnerability advisory is informational and never
//! blocks a push.

use regex::Regex;

use crate::error::{BranchOpsError, Result};
use crate::git::GitRunner;

/// How to push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Normal,
    ForceWithLease,
}

/// What a completed push reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// Trimmed stdout from git, empty when there was nothing to say.
    pub summary: String,

    /// Non-fatal advisory extracted from the remote message, if any.
    pub advisory: Option<String>,
}

/// Choose the push mode. Amend flows rewrote history, so they always
/// force-with-lease; otherwise force only when explicitly requested.
pub fn decide_mode(force: bool, amend_flow: bool) -> PushMode {
    if force || amend_flow {
        PushMode::ForceWithLease
    } else {
        PushMode::Normal
    }
}

/// Push HEAD to origin in the given mode.
pub fn push<G: GitRunner>(git: &G, mode: PushMode) -> Result<PushOutcome> {
    let args: &[&str] = match mode {
        PushMode::Normal => &["push", "origin", "HEAD"],
        PushMode::ForceWithLease => &["push", "origin", "HEAD", "--force-with-lease"],
    };

    let output = git.run(args)?;
    if !output.success() {
        return Err(BranchOpsError::RemoteOperationFailed(
            output.stderr.trim().to_string(),
        ));
    }

    Ok(PushOutcome {
        summary: output.stdout.trim().to_string(),
        advisory: extract_advisory(&output.stderr),
    })
}

/// Pull the vulnerability advisory out of the remote message: the first two
/// meaningful lines, with `remote:` prefixes stripped.
fn extract_advisory(remote_text: &str) -> Option<String> {
    let pattern = Regex::new(r"GitHub found \d+ (vulnerabilities|vulnerability)").ok()?;
    if !pattern.is_match(remote_text) {
        return None;
    }

    let lines: Vec<String> = remote_text
        .lines()
        .map(|line| line.trim().trim_start_matches("remote:").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    Some(lines.iter().take(2).cloned().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeGitRunner;
    use crate::git::CommandOutput;

    #[test]
    fn test_decide_mode() {
        assert_eq!(decide_mode(false, false), PushMode::Normal);
        assert_eq!(decide_mode(true, false), PushMode::ForceWithLease);
        assert_eq!(decide_mode(false, true), PushMode::ForceWithLease);
        assert_eq!(decide_mode(true, true), PushMode::ForceWithLease);
    }

    #[test]
    fn test_push_uses_force_with_lease_flag() {
        let git = FakeGitRunner::new();
        push(&git, PushMode::ForceWithLease).unwrap();
        assert!(git.ran("push origin HEAD --force-with-lease"));

        push(&git, PushMode::Normal).unwrap();
        assert!(git.calls().contains(&"push origin HEAD".to_string()));
    }

    #[test]
    fn test_nonzero_exit_is_remote_failure() {
        let git = FakeGitRunner::new();
        git.stub(
            "push origin HEAD",
            CommandOutput::err("! [rejected] HEAD -> main (fetch first)", 1),
        );
        let err = push(&git, PushMode::Normal).unwrap_err();
        assert!(matches!(err, BranchOpsError::RemoteOperationFailed(_)));
    }

    #[test]
    fn test_advisory_is_surfaced_without_blocking() {
        let git = FakeGitRunner::new();
        git.stub(
            "push origin HEAD",
            CommandOutput {
                stdout: "Everything up-to-date\n".to_string(),
                stderr: "remote: GitHub found 3 vulnerabilities on acme/checkin's default branch\nremote: (2 high, 1 moderate)\nremote: see https://github.com/acme/checkin/security\n".to_string(),
                exit_code: 0,
            },
        );

        let outcome = push(&git, PushMode::Normal).unwrap();
        assert_eq!(outcome.summary, "Everything up-to-date");
        let advisory = outcome.advisory.unwrap();
        assert!(advisory.starts_with("GitHub found 3 vulnerabilities"));
        assert!(advisory.contains("(2 high, 1 moderate)"));
        assert!(!advisory.contains("security"));
    }

    #[test]
    fn test_no_advisory_in_ordinary_push() {
        let git = FakeGitRunner::new();
        git.stub(
            "push origin HEAD",
            CommandOutput {
                stdout: String::new(),
                stderr: "To github.com:acme/checkin.git\n".to_string(),
                exit_code: 0,
            },
        );
        let outcome = push(&git, PushMode::Normal).unwrap();
        assert!(outcome.advisory.is_none());
    }
}
