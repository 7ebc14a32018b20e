//! Check definitions.
//!
//! One [`CheckDefinition`] per quality gate, built once per pipeline run in
//! the configured order. Whether a check is enabled is decided here, from an
//! immutable snapshot of the flags and the change set, never re-read later.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use branchops_core::changeset::{impacted_test_subset, ChangeSet, DEFAULT_TEST_SCOPE};
use branchops_core::config::Config;

use crate::classify::OutputClassifier;
use crate::pipeline::PipelineOptions;

/// The builtin quality gates, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCheck {
    /// Dependency sync via bundler.
    Bundle,

    /// Static security scan.
    Brakeman,

    /// Ruby style check.
    Rubocop,

    /// Test run, scoped to the impacted spec subset.
    Rspec,

    /// Javascript lint.
    YarnLint,
}

impl BuiltinCheck {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinCheck::Bundle => "bundle",
            BuiltinCheck::Brakeman => "brakeman",
            BuiltinCheck::Rubocop => "rubocop",
            BuiltinCheck::Rspec => "rspec",
            BuiltinCheck::YarnLint => "yarn_lint",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bundle" => Some(BuiltinCheck::Bundle),
            "brakeman" => Some(BuiltinCheck::Brakeman),
            "rubocop" => Some(BuiltinCheck::Rubocop),
            "rspec" => Some(BuiltinCheck::Rspec),
            "yarn_lint" => Some(BuiltinCheck::YarnLint),
            _ => None,
        }
    }
}

/// A cheap pre-check that can satisfy a gate without running its main
/// command. Used by the bundle gate: when `bundle check` already reports the
/// dependencies satisfied, the slow install never runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastPath {
    pub command: Vec<String>,
    pub marker: &'static str,
}

/// Immutable configuration for one gate in one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDefinition {
    pub name: &'static str,

    /// Command to execute (first element is the executable).
    pub command: Vec<String>,

    /// Extra environment for the invocation.
    pub env: Vec<(String, String)>,

    pub fast_path: Option<FastPath>,

    pub classifier: OutputClassifier,

    /// False when the skip rule fired at build time.
    pub enabled: bool,

    /// Why the check is disabled, for the skip report.
    pub skip_reason: &'static str,

    pub timeout_secs: u64,
}

/// Build the ordered check list for one pipeline run.
///
/// Order comes from `config.checks`; unknown names are ignored. A check is
/// disabled when its explicit skip flag is set, when skip-all is set, or
/// when the change-set partition it cares about is empty and force mode is
/// off. The bundle gate only cares whether anything changed at all.
pub fn build_checks(
    config: &Config,
    changeset: &ChangeSet,
    options: &PipelineOptions,
    repo_root: &Path,
) -> Vec<CheckDefinition> {
    config
        .checks
        .iter()
        .filter_map(|name| BuiltinCheck::from_name(name))
        .map(|check| build_check(check, config, changeset, options, repo_root))
        .collect()
}

fn build_check(
    check: BuiltinCheck,
    config: &Config,
    changeset: &ChangeSet,
    options: &PipelineOptions,
    repo_root: &Path,
) -> CheckDefinition {
    let ruby_relevant = options.force || changeset.has_ruby_changes();
    let js_relevant = options.force || changeset.has_javascript_changes();
    let timeout_secs = config.check_timeout_secs;

    match check {
        BuiltinCheck::Bundle => {
            let (enabled, skip_reason) = if options.skip_all {
                (false, "validations skipped")
            } else if changeset.is_empty() && !options.force {
                (false, "no checkable changes")
            } else {
                (true, "")
            };
            CheckDefinition {
                name: check.name(),
                command: vec!["bin/bundle".into(), "install".into()],
                env: Vec::new(),
                fast_path: Some(FastPath {
                    command: vec!["bin/bundle".into(), "check".into()],
                    marker: "The Gemfile's dependencies are satisfied",
                }),
                classifier: OutputClassifier::SuccessMarker {
                    markers: vec!["Bundle complete"],
                },
                enabled,
                skip_reason,
                timeout_secs,
            }
        }

        BuiltinCheck::Brakeman => {
            let (enabled, skip_reason) =
                skip_rule(options.skip_all, options.skip_brakeman, ruby_relevant, "no ruby changes");
            CheckDefinition {
                name: check.name(),
                command: vec!["bin/brakeman".into()],
                env: Vec::new(),
                fast_path: None,
                classifier: OutputClassifier::SuccessMarker {
                    markers: vec!["No warnings found"],
                },
                enabled,
                skip_reason,
                timeout_secs,
            }
        }

        BuiltinCheck::Rubocop => {
            let (enabled, skip_reason) =
                skip_rule(options.skip_all, options.skip_rubocop, ruby_relevant, "no ruby changes");
            let mut command = vec!["bin/rubocop".into()];
            command.extend(relative_args(&changeset.ruby_files()));
            CheckDefinition {
                name: check.name(),
                command,
                env: Vec::new(),
                fast_path: None,
                classifier: OutputClassifier::SuccessMarker {
                    markers: vec!["no offenses detected"],
                },
                enabled,
                skip_reason,
                timeout_secs,
            }
        }

        BuiltinCheck::Rspec => {
            let (enabled, skip_reason) =
                skip_rule(options.skip_all, options.skip_rspec, ruby_relevant, "no ruby changes");
            let subset = impacted_test_subset(changeset, repo_root);
            let mut command = vec!["bin/rspec".into()];
            if subset.is_empty() {
                command.extend(DEFAULT_TEST_SCOPE.iter().map(|s| (*s).to_string()));
            } else {
                command.extend(relative_args(&subset));
            }
            CheckDefinition {
                name: check.name(),
                command,
                env: vec![("RUBYOPT".into(), "-W0".into())],
                fast_path: None,
                classifier: OutputClassifier::SuccessMarker {
                    markers: vec!["0 failures"],
                },
                enabled,
                skip_reason,
                timeout_secs,
            }
        }

        BuiltinCheck::YarnLint => {
            let (enabled, skip_reason) =
                skip_rule(options.skip_all, options.skip_lint, js_relevant, "no javascript changes");
            let mut command = vec!["bin/yarn".into(), "lint".into()];
            command.extend(relative_args(&changeset.secondary_files));
            CheckDefinition {
                name: check.name(),
                command,
                env: Vec::new(),
                fast_path: None,
                classifier: OutputClassifier::ExitStatus,
                enabled,
                skip_reason,
                timeout_secs,
            }
        }
    }
}

/// Build the steps that bring a fresh branch's environment in sync:
/// dependencies, database schema, and javascript packages. All steps run
/// unconditionally; the bundle step keeps its cheap pre-check.
pub fn build_setup_steps(config: &Config) -> Vec<CheckDefinition> {
    let timeout_secs = config.check_timeout_secs;
    vec![
        CheckDefinition {
            name: "bundle",
            command: vec!["bin/bundle".into(), "install".into()],
            env: Vec::new(),
            fast_path: Some(FastPath {
                command: vec!["bin/bundle".into(), "check".into()],
                marker: "The Gemfile's dependencies are satisfied",
            }),
            classifier: OutputClassifier::SuccessMarker {
                markers: vec!["Bundle complete"],
            },
            enabled: true,
            skip_reason: "",
            timeout_secs,
        },
        CheckDefinition {
            name: "db_migrate",
            command: vec!["bin/rails".into(), "db:migrate".into()],
            env: Vec::new(),
            fast_path: None,
            classifier: OutputClassifier::ExitStatus,
            enabled: true,
            skip_reason: "",
            timeout_secs,
        },
        CheckDefinition {
            name: "yarn_install",
            command: vec!["bin/yarn".into(), "install".into()],
            env: Vec::new(),
            fast_path: None,
            classifier: OutputClassifier::ExitStatus,
            enabled: true,
            skip_reason: "",
            timeout_secs,
        },
    ]
}

fn skip_rule(
    skip_all: bool,
    skip_flag: bool,
    relevant: bool,
    irrelevant_reason: &'static str,
) -> (bool, &'static str) {
    if skip_all {
        (false, "validations skipped")
    } else if skip_flag {
        (false, "skipped by flag")
    } else if !relevant {
        (false, irrelevant_reason)
    } else {
        (true, "")
    }
}

fn relative_args(paths: &BTreeSet<PathBuf>) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}
