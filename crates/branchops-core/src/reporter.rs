//! Colored console reporting.

use crate::config::Colors;

/// Prints `--SUCCESS:` / `--WARNING:` / `--ERROR:` lines with the configured
/// terminal colors. Fatal errors are handled by propagating `Err` to the
/// binary, not by exiting from here.
#[derive(Debug, Clone)]
pub struct Reporter {
    colors: Colors,
}

impl Reporter {
    pub fn new(colors: Colors) -> Self {
        Self { colors }
    }

    pub fn success(&self, text: &str) {
        println!("{}--SUCCESS: {text}{}", self.colors.green, self.colors.reset);
    }

    pub fn warning(&self, text: &str) {
        println!("{}--WARNING: {text}{}", self.colors.yellow, self.colors.reset);
    }

    pub fn error(&self, text: &str) {
        eprintln!("{}--ERROR: {text}{}", self.colors.red, self.colors.reset);
    }

    /// Print raw tool output, skipping empty excerpts.
    pub fn excerpt(&self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            println!("{text}");
        }
    }
}
