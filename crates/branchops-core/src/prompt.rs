//! Interactive input boundary.

use std::io::{BufRead, Write};

use crate::error::{BranchOpsError, Result};

/// Sentinel line that terminates a multi-line read.
pub const MULTILINE_SENTINEL: &str = "$end";

/// Source of interactive answers. Implemented over stdin for the binary and
/// by [`crate::fakes::ScriptedPrompt`] in tests.
pub trait PromptSource {
    /// Print `prompt` and read a single trimmed line.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Print `prompt` and read lines until [`MULTILINE_SENTINEL`], joining
    /// them with newlines.
    fn read_multiline(&mut self, prompt: &str) -> Result<String>;
}

/// [`PromptSource`] over process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }

    fn read_raw_line(&self) -> Result<String> {
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(BranchOpsError::PromptClosed);
        }
        Ok(line.trim().to_string())
    }
}

impl PromptSource for StdinPrompt {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        self.read_raw_line()
    }

    fn read_multiline(&mut self, prompt: &str) -> Result<String> {
        println!("{prompt} (finish with a line containing only {MULTILINE_SENTINEL})");
        let mut lines = Vec::new();
        loop {
            let line = self.read_raw_line()?;
            if line == MULTILINE_SENTINEL {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}
