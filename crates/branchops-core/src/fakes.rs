//! In-memory fakes for tests.
//!
//! Shared by this crate's unit tests and by downstream crates, so they live
//! in the library proper rather than behind `#[cfg(test)]`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::git::{CommandOutput, GitRunner};
use crate::prompt::PromptSource;

/// [`GitRunner`] that replays stubbed outputs and records every invocation.
///
/// Commands are keyed by their space-joined argument list. Repeated stubs for
/// the same key are consumed in order; the last one sticks. Unstubbed
/// commands succeed with empty output.
#[derive(Debug, Default)]
pub struct FakeGitRunner {
    stubs: RefCell<HashMap<String, Vec<CommandOutput>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeGitRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub the output for `git <command>`.
    pub fn stub(&self, command: &str, output: CommandOutput) {
        self.stubs
            .borrow_mut()
            .entry(command.to_string())
            .or_default()
            .push(output);
    }

    /// Every command run so far, space-joined, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any invocation started with the given prefix.
    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl GitRunner for FakeGitRunner {
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let key = args.join(" ");
        self.calls.borrow_mut().push(key.clone());

        let mut stubs = self.stubs.borrow_mut();
        match stubs.get_mut(&key) {
            Some(outputs) if outputs.len() > 1 => Ok(outputs.remove(0)),
            Some(outputs) => Ok(outputs[0].clone()),
            None => Ok(CommandOutput::ok("")),
        }
    }
}

/// [`PromptSource`] that replays scripted answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    /// Answers are consumed front to back; multi-line reads consume one entry.
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|s| (*s).to_string()).collect()),
        }
    }
}

impl PromptSource for ScriptedPrompt {
    fn read_line(&mut self, _prompt: &str) -> Result<String> {
        let mut answers = self.answers.borrow_mut();
        if answers.is_empty() {
            return Err(crate::error::BranchOpsError::PromptClosed);
        }
        Ok(answers.remove(0))
    }

    fn read_multiline(&mut self, prompt: &str) -> Result<String> {
        self.read_line(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_runner_replays_stubs_in_order() {
        let runner = FakeGitRunner::new();
        runner.stub("status --porcelain", CommandOutput::ok(" M a.rb\n"));
        runner.stub("status --porcelain", CommandOutput::ok(""));

        let first = runner.run(&["status", "--porcelain"]).unwrap();
        let second = runner.run(&["status", "--porcelain"]).unwrap();
        let third = runner.run(&["status", "--porcelain"]).unwrap();

        assert_eq!(first.stdout, " M a.rb\n");
        assert_eq!(second.stdout, "");
        assert_eq!(third.stdout, "");
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn fake_runner_defaults_to_empty_success() {
        let runner = FakeGitRunner::new();
        let output = runner.run(&["pull"]).unwrap();
        assert!(output.success());
        assert!(runner.ran("pull"));
    }

    #[test]
    fn scripted_prompt_errors_when_exhausted() {
        let mut prompt = ScriptedPrompt::new(&["one"]);
        assert_eq!(prompt.read_line("?").unwrap(), "one");
        assert!(prompt.read_line("?").is_err());
    }
}
