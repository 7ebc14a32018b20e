//! branchops core library.
//!
//! Domain logic for the branchops workflow tool: branch naming and
//! validation, change-set classification, branch lifecycle, and push
//! execution, all over a mockable git command boundary.

pub mod branch;
pub mod changeset;
pub mod config;
pub mod error;
pub mod fakes;
pub mod git;
pub mod lifecycle;
pub mod prompt;
pub mod push;
pub mod reporter;
pub mod telemetry;

pub use branch::{is_main, matches_convention, BranchName};
pub use changeset::{classify, impacted_test_subset, ChangeSet, DEFAULT_TEST_SCOPE};
pub use config::{Colors, Config};
pub use error::{BranchOpsError, NameError, Result};
pub use git::{is_git_repo, CommandOutput, GitRunner, ProcessGitRunner};
pub use lifecycle::BranchLifecycle;
pub use prompt::{PromptSource, StdinPrompt, MULTILINE_SENTINEL};
pub use push::{decide_mode, push, PushMode, PushOutcome};
pub use reporter::Reporter;
pub use telemetry::init_tracing;

/// branchops version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
