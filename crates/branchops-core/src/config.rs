//! Process-wide configuration, loaded once at startup.
//!
//! The configuration file is YAML. It is read a single time, validated into
//! an immutable [`Config`], and passed by reference into every component.
//! Nothing reads configuration ambiently after startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BranchOpsError, Result};

/// Default ordered check names when the file does not list any.
pub const DEFAULT_CHECKS: &[&str] = &["bundle", "brakeman", "rubocop", "rspec", "yarn_lint"];

/// Default per-check timeout in seconds.
pub const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 600;

/// ANSI color codes used by the console reporter.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Colors {
    pub green: String,
    pub yellow: String,
    pub red: String,
    pub reset: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            green: "\u{1b}[0;32m".to_string(),
            yellow: "\u{1b}[0;33m".to_string(),
            red: "\u{1b}[0;31m".to_string(),
            reset: "\u{1b}[0m".to_string(),
        }
    }
}

/// Raw file shape. Required keys are optional here so that a missing key can
/// be reported as [`BranchOpsError::ConfigurationMissing`] instead of a
/// generic deserialization error.
#[derive(Debug, Deserialize)]
struct RawConfig {
    dev_initials: Option<String>,
    repo_path: Option<PathBuf>,
    projects: Option<Vec<String>>,
    #[serde(default)]
    main_branch: Option<String>,
    #[serde(default)]
    ticketless_project: Option<String>,
    #[serde(default)]
    checks: Option<Vec<String>>,
    #[serde(default)]
    check_timeout_secs: Option<u64>,
    #[serde(default)]
    tracker_url: Option<String>,
    #[serde(default)]
    colors: Colors,
}

/// Immutable, validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Developer initials token, first segment of every feature branch.
    pub dev_initials: String,

    /// Path to the repository all git commands run against.
    pub repo_path: PathBuf,

    /// Valid project names, matched case-insensitively.
    pub projects: Vec<String>,

    /// The trunk branch. Protected from commits and pruning.
    pub main_branch: String,

    /// Project allowed to create branches without a ticket number.
    pub ticketless_project: Option<String>,

    /// Ordered list of enabled check names.
    pub checks: Vec<String>,

    /// Per-check timeout in seconds.
    pub check_timeout_secs: u64,

    /// Base URL for ticket links embedded in commit messages.
    pub tracker_url: Option<String>,

    /// Terminal color codes.
    pub colors: Colors,
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BranchOpsError::ConfigurationUnreadable(format!("{}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(text)
            .map_err(|e| BranchOpsError::ConfigurationUnreadable(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let dev_initials = required(raw.dev_initials, "dev_initials")?;
        let repo_path = required(raw.repo_path, "repo_path")?;
        let projects = required(raw.projects, "projects")?;
        if projects.is_empty() {
            return Err(BranchOpsError::ConfigurationMissing {
                key: "projects".to_string(),
            });
        }

        let mut projects: Vec<String> = projects.iter().map(|p| p.to_lowercase()).collect();
        projects.sort();

        let checks = raw
            .checks
            .unwrap_or_else(|| DEFAULT_CHECKS.iter().map(|s| (*s).to_string()).collect());

        Ok(Self {
            dev_initials: dev_initials.to_lowercase(),
            repo_path,
            projects,
            main_branch: raw.main_branch.unwrap_or_else(|| "main".to_string()),
            ticketless_project: raw.ticketless_project.map(|p| p.to_lowercase()),
            checks,
            check_timeout_secs: raw.check_timeout_secs.unwrap_or(DEFAULT_CHECK_TIMEOUT_SECS),
            tracker_url: raw.tracker_url,
            colors: raw.colors,
        })
    }

    /// Human-readable project list for prompts: "a, b, or c".
    pub fn project_prompt_text(&self) -> String {
        match self.projects.as_slice() {
            [] => String::new(),
            [one] => one.clone(),
            [a, b] => format!("{a} or {b}"),
            many => {
                let head = many[..many.len() - 1].join(", ");
                format!("{head}, or {}", many[many.len() - 1])
            }
        }
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| BranchOpsError::ConfigurationMissing {
        key: key.to_string(),
    })
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        dev_initials: "jd".to_string(),
        repo_path: PathBuf::from("/tmp/repo"),
        projects: vec!["checkin".to_string(), "portal".to_string()],
        main_branch: "main".to_string(),
        ticketless_project: Some("portal".to_string()),
        checks: DEFAULT_CHECKS.iter().map(|s| (*s).to_string()).collect(),
        check_timeout_secs: DEFAULT_CHECK_TIMEOUT_SECS,
        tracker_url: Some("https://tracker.example.com/browse".to_string()),
        colors: Colors::default(),
    }
}
