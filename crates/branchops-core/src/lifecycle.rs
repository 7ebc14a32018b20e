//! Branch lifecycle operations.
//!
//! State is never cached: every operation re-derives where it stands from
//! the live repository, so `OnMain` versus `OnFeatureBranch` is always a
//! fresh query. A dirty working tree blocks every branch switch, without
//! retry.

use tracing::{debug, info};

use crate::branch::{self, BranchName};
use crate::changeset::ChangeSet;
use crate::config::Config;
use crate::error::{BranchOpsError, Result};
use crate::git::GitRunner;
use crate::prompt::PromptSource;
use crate::reporter::Reporter;

const COMMIT_SUBJECT_LIMIT: usize = 80;

/// Branch lifecycle state machine over one repository.
pub struct BranchLifecycle<'a, G: GitRunner> {
    git: &'a G,
    config: &'a Config,
}

impl<'a, G: GitRunner> BranchLifecycle<'a, G> {
    pub fn new(git: &'a G, config: &'a Config) -> Self {
        Self { git, config }
    }

    /// Name of the currently checked-out branch.
    pub fn current_branch(&self) -> Result<String> {
        let output = self.git.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(output.stdout.trim().to_string())
    }

    pub fn is_on_main(&self) -> Result<bool> {
        Ok(branch::is_main(&self.current_branch()?, self.config))
    }

    /// Whether the working tree has uncommitted or unstaged changes.
    pub fn working_tree_dirty(&self) -> Result<bool> {
        let output = self.git.run(&["status", "--porcelain"])?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// The human-readable status report, as consumed by the classifier.
    pub fn status_text(&self) -> Result<String> {
        Ok(self.git.run(&["status"])?.stdout)
    }

    /// The current change set, derived fresh from the working tree.
    pub fn changeset(&self) -> Result<ChangeSet> {
        Ok(crate::changeset::classify(&self.status_text()?))
    }

    /// All local branches except the trunk.
    pub fn feature_branches(&self) -> Result<Vec<String>> {
        let output = self.git.run(&["branch", "--format=%(refname:short)"])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !branch::is_main(line, self.config))
            .map(String::from)
            .collect())
    }

    /// Create a new feature branch from an up-to-date trunk.
    ///
    /// Prompts for project, ticket, and descriptor, reprompting on invalid
    /// input. The ticket prompt may be left empty for the configured
    /// ticket-less project.
    pub fn create<P: PromptSource>(
        &self,
        prompt: &mut P,
        reporter: &Reporter,
    ) -> Result<BranchName> {
        self.checkout_main()?;
        self.pull()?;

        let project = self.ask_for_project(prompt, reporter)?;
        let ticket = self.ask_for_ticket(prompt, reporter, &project)?;
        let descriptor = self.ask_for_descriptor(prompt, reporter)?;

        let name = BranchName::parse(
            &self.config.dev_initials,
            &project,
            ticket.as_deref(),
            &descriptor,
            self.config,
        )?;

        let name_text = name.to_string();
        info!(branch = %name_text, "creating branch");
        let output = self.git.run(&["checkout", "-b", &name_text])?;
        if !output.success() {
            if output.stderr.contains("already exists") {
                return Err(BranchOpsError::BranchAlreadyExists(name_text));
            }
            return Err(BranchOpsError::RemoteOperationFailed(
                output.stderr.trim().to_string(),
            ));
        }

        Ok(name)
    }

    /// Switch to the single branch containing `fragment`.
    pub fn checkout_by_substring(&self, fragment: &str) -> Result<String> {
        let target = self.find_single(fragment)?;
        self.require_clean()?;

        let output = self.git.run(&["checkout", &target])?;
        if !output.success() {
            return Err(BranchOpsError::RemoteOperationFailed(
                output.stderr.trim().to_string(),
            ));
        }
        Ok(target)
    }

    /// Force-delete the single branch containing `fragment`.
    pub fn delete_by_substring(&self, fragment: &str) -> Result<String> {
        let target = self.find_single(fragment)?;
        self.checkout_main()?;

        let output = self.git.run(&["branch", "-D", &target])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(target)
    }

    /// Delete branches, returning the deleted names.
    ///
    /// With no patterns, deletes branches already merged into the trunk,
    /// sparing the trunk and the current branch; re-running is a no-op.
    /// With patterns, deletes every branch matching any pattern as a
    /// case-insensitive substring, after discarding any pattern equal to the
    /// trunk name.
    pub fn prune(&self, patterns: &[String]) -> Result<Vec<String>> {
        let victims = if patterns.is_empty() {
            self.merged_branches()?
        } else {
            let patterns: Vec<String> = patterns
                .iter()
                .filter(|p| !branch::is_main(p, self.config))
                .map(|p| p.to_lowercase())
                .collect();
            self.checkout_main()?;
            self.feature_branches()?
                .into_iter()
                .filter(|name| {
                    let lower = name.to_lowercase();
                    patterns.iter().any(|p| lower.contains(p))
                })
                .collect()
        };

        let mut deleted = Vec::new();
        for name in victims {
            debug!(branch = %name, "pruning branch");
            let output = self.git.run(&["branch", "-D", &name])?;
            if !output.success() {
                return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
            }
            deleted.push(name);
        }
        Ok(deleted)
    }

    /// Rebase the current branch on an up-to-date trunk. A dirty tree is
    /// first parked in a WIP commit.
    pub fn rebase_on_main(&self) -> Result<String> {
        let branch_name = self.current_branch()?;
        if branch::is_main(&branch_name, self.config) {
            return Err(BranchOpsError::ProtectedBranch {
                action: "rebase".to_string(),
                branch: branch_name,
            });
        }

        if self.working_tree_dirty()? {
            self.wip_commit()?;
        }

        info!(branch = %branch_name, main = %self.config.main_branch, "rebasing on trunk");
        self.switch_to(&self.config.main_branch)?;
        self.pull()?;
        self.switch_to(&branch_name)?;

        let output = self.git.run(&["rebase", &self.config.main_branch])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(branch_name)
    }

    /// Soft-reset to the previous commit, returning its subject.
    pub fn reset_to_previous_commit(&self) -> Result<String> {
        let branch_name = self.current_branch()?;
        if branch::is_main(&branch_name, self.config) {
            return Err(BranchOpsError::ProtectedBranch {
                action: "reset".to_string(),
                branch: branch_name,
            });
        }

        let log = self.git.run(&["log", "--oneline"])?;
        let previous = log
            .stdout
            .lines()
            .nth(1)
            .ok_or_else(|| BranchOpsError::GitError("no previous commit to reset to".into()))?;
        let (sha, subject) = previous
            .split_once(' ')
            .ok_or_else(|| BranchOpsError::GitError(format!("unparseable log line: {previous}")))?;

        let output = self.git.run(&["reset", sha])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(subject.trim().to_string())
    }

    /// Commit all pending work, prompting for subject and body.
    ///
    /// Refused on the trunk, on branches that do not follow the naming
    /// convention, and when there is nothing to commit.
    pub fn commit<P: PromptSource>(&self, prompt: &mut P, reporter: &Reporter) -> Result<()> {
        let branch_name = self.current_branch()?;
        if branch::is_main(&branch_name, self.config) {
            return Err(BranchOpsError::ProtectedBranch {
                action: "commit".to_string(),
                branch: branch_name,
            });
        }
        if !branch::matches_convention(&branch_name, self.config) {
            return Err(BranchOpsError::UnconventionalBranch {
                branch: branch_name,
                expected: format!(
                    "{}-({})-###-descriptor",
                    self.config.dev_initials,
                    self.config.projects.join("|")
                ),
            });
        }
        if !self.working_tree_dirty()? {
            return Err(BranchOpsError::NothingToCommit);
        }

        let subject = self.ask_for_subject(prompt, reporter)?;
        let body = self.ask_for_body(prompt, reporter)?;
        let message = self.commit_message(&branch_name, &subject, &body);

        self.stage_all()?;
        let output = self.git.run(&["commit", "-m", &message])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Fold pending changes into the previous commit without editing it.
    pub fn amend(&self) -> Result<()> {
        self.stage_all()?;
        let output = self.git.run(&["commit", "--amend", "--no-edit"])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Park and drop any working-tree churn, typically the lockfiles and
    /// schema dumps the environment sync tools leave behind.
    pub fn drop_working_changes(&self) -> Result<()> {
        let output = self.git.run(&["stash"])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        let output = self.git.run(&["stash", "clear"])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(())
    }

    fn wip_commit(&self) -> Result<()> {
        self.stage_all()?;
        let output = self.git.run(&["commit", "-m", "WIP"])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        let output = self.git.run(&["pull"])?;
        if !output.success() {
            return Err(BranchOpsError::RemoteOperationFailed(
                output.stderr.trim().to_string(),
            ));
        }
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        let output = self.git.run(&["add", "."])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Reach the trunk. Requires a clean tree unless already there.
    fn checkout_main(&self) -> Result<()> {
        if self.is_on_main()? {
            return Ok(());
        }
        self.require_clean()?;
        self.switch_to(&self.config.main_branch)
    }

    fn switch_to(&self, target: &str) -> Result<()> {
        let output = self.git.run(&["checkout", target])?;
        if !output.success() {
            return Err(BranchOpsError::RemoteOperationFailed(
                output.stderr.trim().to_string(),
            ));
        }
        Ok(())
    }

    fn require_clean(&self) -> Result<()> {
        if self.working_tree_dirty()? {
            return Err(BranchOpsError::DirtyWorkingTree);
        }
        Ok(())
    }

    fn find_single(&self, fragment: &str) -> Result<String> {
        let mut matches: Vec<String> = self
            .feature_branches()?
            .into_iter()
            .filter(|name| name.contains(fragment))
            .collect();

        match matches.len() {
            0 => Err(BranchOpsError::NoMatch {
                fragment: fragment.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(BranchOpsError::AmbiguousMatch {
                fragment: fragment.to_string(),
                candidates: matches,
            }),
        }
    }

    fn merged_branches(&self) -> Result<Vec<String>> {
        let current = self.current_branch()?;
        let output = self.git.run(&[
            "branch",
            "--merged",
            &self.config.main_branch,
            "--format=%(refname:short)",
        ])?;
        if !output.success() {
            return Err(BranchOpsError::GitError(output.stderr.trim().to_string()));
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty() && !branch::is_main(line, self.config) && *line != current
            })
            .map(String::from)
            .collect())
    }

    fn ask_for_project<P: PromptSource>(
        &self,
        prompt: &mut P,
        reporter: &Reporter,
    ) -> Result<String> {
        let choices = self.config.project_prompt_text();
        loop {
            let answer = prompt
                .read_line(&format!("Enter project name ({choices}): "))?
                .to_lowercase();
            if self.config.projects.contains(&answer) {
                return Ok(answer);
            }
            reporter.error(&format!("Must be {choices}"));
        }
    }

    fn ask_for_ticket<P: PromptSource>(
        &self,
        prompt: &mut P,
        reporter: &Reporter,
        project: &str,
    ) -> Result<Option<String>> {
        let ticketless = self.config.ticketless_project.as_deref() == Some(project);
        let label = if ticketless {
            "Enter ticket number (blank for none): "
        } else {
            "Enter ticket number: "
        };
        loop {
            let answer = prompt.read_line(label)?;
            if answer.is_empty() && ticketless {
                return Ok(None);
            }
            if !answer.is_empty() && answer.chars().all(|c| c.is_ascii_digit()) {
                return Ok(Some(answer));
            }
            reporter.error("Must be an integer");
        }
    }

    fn ask_for_descriptor<P: PromptSource>(
        &self,
        prompt: &mut P,
        reporter: &Reporter,
    ) -> Result<String> {
        loop {
            let answer = prompt.read_line("Enter branch descriptor: ")?;
            if !answer.trim().is_empty() {
                return Ok(answer);
            }
            reporter.error("Must include a descriptor");
        }
    }

    fn ask_for_subject<P: PromptSource>(
        &self,
        prompt: &mut P,
        reporter: &Reporter,
    ) -> Result<String> {
        loop {
            let subject = prompt.read_line("Subject: ")?;
            if subject.is_empty() {
                reporter.error("Must include commit subject");
                continue;
            }
            if subject.len() > COMMIT_SUBJECT_LIMIT {
                let over = subject.len() - COMMIT_SUBJECT_LIMIT;
                let noun = if over == 1 { "character" } else { "characters" };
                reporter.error(&format!(
                    "Subject is {over} {noun} too long, must be {COMMIT_SUBJECT_LIMIT} characters or less"
                ));
                continue;
            }
            return Ok(subject);
        }
    }

    fn ask_for_body<P: PromptSource>(&self, prompt: &mut P, reporter: &Reporter) -> Result<String> {
        loop {
            let body = prompt.read_multiline("Message:")?;
            if !body.trim().is_empty() {
                return Ok(body);
            }
            reporter.error("Must include commit message");
        }
    }

    /// Assemble the commit message, linking the ticket when the branch
    /// carries one and a tracker URL is configured. The linked message ends
    /// with the bare ticket URL for terminals without markdown rendering.
    fn commit_message(&self, branch_name: &str, subject: &str, body: &str) -> String {
        let segments: Vec<&str> = branch_name.split('-').collect();
        let link = match (self.config.tracker_url.as_deref(), segments.as_slice()) {
            (Some(base), [_, project, ticket, ..])
                if ticket.chars().all(|c| c.is_ascii_digit()) && !ticket.is_empty() =>
            {
                let key = format!("{}-{}", project.to_uppercase(), ticket);
                let url = format!("{base}/{key}");
                Some((key, url))
            }
            _ => None,
        };

        match link {
            Some((key, url)) => format!("{subject}\n\n### [{key}]({url})\n\n{body}\n\n{url}"),
            None => format!("{subject}\n\n{body}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::fakes::{FakeGitRunner, ScriptedPrompt};
    use crate::git::CommandOutput;

    fn reporter() -> Reporter {
        Reporter::new(crate::config::Colors::default())
    }

    fn on_branch(git: &FakeGitRunner, name: &str) {
        git.stub("rev-parse --abbrev-ref HEAD", CommandOutput::ok(format!("{name}\n")));
    }

    #[test]
    fn test_current_branch_trims_output() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-1-fix");
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        assert_eq!(lifecycle.current_branch().unwrap(), "jd-checkin-1-fix");
        assert!(!lifecycle.is_on_main().unwrap());
    }

    #[test]
    fn test_create_prompts_and_builds_branch() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        // Invalid project and ticket answers are reprompted.
        let mut prompt = ScriptedPrompt::new(&["billing", "checkin", "12a", "42", "fix login"]);
        let name = lifecycle.create(&mut prompt, &reporter()).unwrap();

        assert_eq!(name.to_string(), "jd-checkin-42-fix-login");
        assert!(git.ran("pull"));
        assert!(git.ran("checkout -b jd-checkin-42-fix-login"));
    }

    #[test]
    fn test_create_reports_existing_branch() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        git.stub(
            "checkout -b jd-checkin-42-fix",
            CommandOutput::err("fatal: a branch named 'jd-checkin-42-fix' already exists", 128),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let mut prompt = ScriptedPrompt::new(&["checkin", "42", "fix"]);
        let err = lifecycle.create(&mut prompt, &reporter()).unwrap_err();
        assert!(matches!(err, BranchOpsError::BranchAlreadyExists(_)));
    }

    #[test]
    fn test_create_fails_when_pull_fails() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        git.stub(
            "pull",
            CommandOutput::err("fatal: unable to access remote", 128),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let mut prompt = ScriptedPrompt::new(&["checkin", "42", "fix"]);
        let err = lifecycle.create(&mut prompt, &reporter()).unwrap_err();
        assert!(matches!(err, BranchOpsError::RemoteOperationFailed(_)));
        assert!(!git.ran("checkout -b"));
    }

    #[test]
    fn test_create_off_main_with_dirty_tree_is_blocked() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-1-wip");
        git.stub("status --porcelain", CommandOutput::ok(" M app/foo.rb\n"));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let mut prompt = ScriptedPrompt::new(&[]);
        let err = lifecycle.create(&mut prompt, &reporter()).unwrap_err();
        assert!(matches!(err, BranchOpsError::DirtyWorkingTree));
        assert!(!git.ran("checkout main"));
    }

    #[test]
    fn test_checkout_by_substring_disambiguates() {
        let git = FakeGitRunner::new();
        git.stub(
            "branch --format=%(refname:short)",
            CommandOutput::ok("main\njd-checkin-1-login\njd-checkin-2-logout\n"),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        assert!(matches!(
            lifecycle.checkout_by_substring("nothing").unwrap_err(),
            BranchOpsError::NoMatch { .. }
        ));
        assert!(matches!(
            lifecycle.checkout_by_substring("log").unwrap_err(),
            BranchOpsError::AmbiguousMatch { candidates, .. } if candidates.len() == 2
        ));
        assert_eq!(lifecycle.checkout_by_substring("login").unwrap(), "jd-checkin-1-login");
        assert!(git.ran("checkout jd-checkin-1-login"));
    }

    #[test]
    fn test_checkout_blocked_by_dirty_tree() {
        let git = FakeGitRunner::new();
        git.stub(
            "branch --format=%(refname:short)",
            CommandOutput::ok("jd-checkin-1-login\n"),
        );
        git.stub("status --porcelain", CommandOutput::ok("?? new_file\n"));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let err = lifecycle.checkout_by_substring("login").unwrap_err();
        assert!(matches!(err, BranchOpsError::DirtyWorkingTree));
        assert!(!git.ran("checkout jd-checkin-1-login"));
    }

    #[test]
    fn test_delete_by_substring_force_deletes() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        git.stub(
            "branch --format=%(refname:short)",
            CommandOutput::ok("main\njd-checkin-1-login\n"),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        assert_eq!(lifecycle.delete_by_substring("login").unwrap(), "jd-checkin-1-login");
        assert!(git.ran("branch -D jd-checkin-1-login"));
    }

    #[test]
    fn test_prune_without_patterns_deletes_merged_only() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-9-current");
        git.stub(
            "branch --merged main --format=%(refname:short)",
            CommandOutput::ok("main\njd-checkin-1-done\njd-checkin-9-current\n"),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let deleted = lifecycle.prune(&[]).unwrap();
        assert_eq!(deleted, vec!["jd-checkin-1-done"]);
        assert!(!git.ran("branch -D main"));
        assert!(!git.ran("branch -D jd-checkin-9-current"));
    }

    #[test]
    fn test_prune_is_idempotent() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        git.stub(
            "branch --merged main --format=%(refname:short)",
            CommandOutput::ok("main\njd-checkin-1-done\n"),
        );
        git.stub(
            "branch --merged main --format=%(refname:short)",
            CommandOutput::ok("main\n"),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        assert_eq!(lifecycle.prune(&[]).unwrap(), vec!["jd-checkin-1-done"]);
        assert!(lifecycle.prune(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_prune_with_patterns_never_touches_main() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        git.stub(
            "branch --format=%(refname:short)",
            CommandOutput::ok("main\njd-checkin-1-LOGIN\njd-portal-cleanup\n"),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let deleted = lifecycle
            .prune(&["main".to_string(), "login".to_string()])
            .unwrap();
        assert_eq!(deleted, vec!["jd-checkin-1-LOGIN"]);
        assert!(!git.ran("branch -D main"));
    }

    #[test]
    fn test_rebase_parks_dirty_tree_in_wip_commit() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-1-fix");
        git.stub("status --porcelain", CommandOutput::ok(" M app/foo.rb\n"));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let rebased = lifecycle.rebase_on_main().unwrap();
        assert_eq!(rebased, "jd-checkin-1-fix");
        assert!(git.ran("commit -m WIP"));
        assert!(git.ran("checkout main"));
        assert!(git.ran("pull"));
        assert!(git.ran("checkout jd-checkin-1-fix"));
        assert!(git.ran("rebase main"));
    }

    #[test]
    fn test_rebase_fails_when_trunk_pull_fails() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-1-fix");
        git.stub("pull", CommandOutput::err("fatal: could not read from remote", 128));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let err = lifecycle.rebase_on_main().unwrap_err();
        assert!(matches!(err, BranchOpsError::RemoteOperationFailed(_)));
        assert!(!git.ran("rebase main"));
    }

    #[test]
    fn test_rebase_refused_on_main() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        assert!(matches!(
            lifecycle.rebase_on_main().unwrap_err(),
            BranchOpsError::ProtectedBranch { .. }
        ));
    }

    #[test]
    fn test_reset_reports_previous_subject() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-1-fix");
        git.stub(
            "log --oneline",
            CommandOutput::ok("abc123 current work\ndef456 previous subject\n"),
        );
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        assert_eq!(lifecycle.reset_to_previous_commit().unwrap(), "previous subject");
        assert!(git.ran("reset def456"));
    }

    #[test]
    fn test_reset_refused_on_main() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        assert!(matches!(
            lifecycle.reset_to_previous_commit().unwrap_err(),
            BranchOpsError::ProtectedBranch { .. }
        ));
    }

    #[test]
    fn test_commit_refused_on_main() {
        let git = FakeGitRunner::new();
        on_branch(&git, "main");
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        let mut prompt = ScriptedPrompt::new(&[]);
        assert!(matches!(
            lifecycle.commit(&mut prompt, &reporter()).unwrap_err(),
            BranchOpsError::ProtectedBranch { .. }
        ));
    }

    #[test]
    fn test_commit_refused_on_unconventional_branch() {
        let git = FakeGitRunner::new();
        on_branch(&git, "feature/login");
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        let mut prompt = ScriptedPrompt::new(&[]);
        assert!(matches!(
            lifecycle.commit(&mut prompt, &reporter()).unwrap_err(),
            BranchOpsError::UnconventionalBranch { .. }
        ));
    }

    #[test]
    fn test_commit_refused_with_clean_tree() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-1-fix");
        git.stub("status --porcelain", CommandOutput::ok(""));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        let mut prompt = ScriptedPrompt::new(&[]);
        assert!(matches!(
            lifecycle.commit(&mut prompt, &reporter()).unwrap_err(),
            BranchOpsError::NothingToCommit
        ));
    }

    #[test]
    fn test_amend_fails_when_staging_fails() {
        let git = FakeGitRunner::new();
        git.stub("add .", CommandOutput::err("fatal: pathspec error", 128));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let err = lifecycle.amend().unwrap_err();
        assert!(matches!(err, BranchOpsError::GitError(_)));
        assert!(!git.ran("commit --amend"));
    }

    #[test]
    fn test_drop_working_changes_stashes_then_clears() {
        let git = FakeGitRunner::new();
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        lifecycle.drop_working_changes().unwrap();
        assert_eq!(git.calls(), vec!["stash", "stash clear"]);
    }

    #[test]
    fn test_commit_reprompts_empty_body() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-42-fix");
        git.stub("status --porcelain", CommandOutput::ok(" M app/foo.rb\n"));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let mut prompt = ScriptedPrompt::new(&["Fix the login flow", "", "Details here"]);
        lifecycle.commit(&mut prompt, &reporter()).unwrap();

        let commit_call = git
            .calls()
            .into_iter()
            .find(|c| c.starts_with("commit -m"))
            .unwrap();
        assert!(commit_call.contains("Details here"));
    }

    #[test]
    fn test_commit_links_ticket_and_reprompts_long_subject() {
        let git = FakeGitRunner::new();
        on_branch(&git, "jd-checkin-42-fix");
        git.stub("status --porcelain", CommandOutput::ok(" M app/foo.rb\n"));
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);

        let long_subject = "x".repeat(81);
        let mut prompt = ScriptedPrompt::new(&[&long_subject, "Fix the login flow", "Details here"]);
        lifecycle.commit(&mut prompt, &reporter()).unwrap();

        let commit_call = git
            .calls()
            .into_iter()
            .find(|c| c.starts_with("commit -m"))
            .unwrap();
        assert!(commit_call.contains("Fix the login flow"));
        assert!(commit_call.contains("[CHECKIN-42](https://tracker.example.com/browse/CHECKIN-42)"));
        assert!(commit_call.contains("Details here"));
    }

    #[test]
    fn test_commit_message_ends_with_bare_ticket_url() {
        let git = FakeGitRunner::new();
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        let message = lifecycle.commit_message("jd-checkin-42-fix", "Subject", "Body");
        assert_eq!(
            message,
            "Subject\n\n\
             ### [CHECKIN-42](https://tracker.example.com/browse/CHECKIN-42)\n\n\
             Body\n\n\
             https://tracker.example.com/browse/CHECKIN-42"
        );
    }

    #[test]
    fn test_commit_message_without_ticket_omits_link() {
        let git = FakeGitRunner::new();
        let config = test_config();
        let lifecycle = BranchLifecycle::new(&git, &config);
        let message = lifecycle.commit_message("jd-portal-landing-page", "Subject", "Body");
        assert_eq!(message, "Subject\n\nBody");
    }
}
