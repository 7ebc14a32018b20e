//! Domain-level error taxonomy for branchops.

/// Errors produced by branch name validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NameError {
    #[error("'{project}' is not a configured project (expected one of: {expected})")]
    InvalidProject { project: String, expected: String },

    #[error("ticket must be a non-empty digit string, got '{ticket}'")]
    InvalidTicket { ticket: String },

    #[error("branch descriptor must not be empty")]
    EmptyDescriptor,
}

/// branchops domain errors.
#[derive(Debug, thiserror::Error)]
pub enum BranchOpsError {
    #[error("required configuration key missing: {key}")]
    ConfigurationMissing { key: String },

    #[error("could not read configuration: {0}")]
    ConfigurationUnreadable(String),

    #[error("validation failed: {0}")]
    Validation(#[from] NameError),

    #[error("cannot switch branches, please commit or stash changes")]
    DirtyWorkingTree,

    #[error("no branches match '{fragment}'")]
    NoMatch { fragment: String },

    #[error("more than one branch matches '{fragment}': {}", .candidates.join(", "))]
    AmbiguousMatch {
        fragment: String,
        candidates: Vec<String>,
    },

    #[error("branch '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("cannot {action} on '{branch}'")]
    ProtectedBranch { action: String, branch: String },

    #[error("branch '{branch}' does not follow the naming convention: {expected}")]
    UnconventionalBranch { branch: String, expected: String },

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("check '{name}' failed: {excerpt}")]
    GateFailed { name: String, excerpt: String },

    #[error("remote operation failed: {0}")]
    RemoteOperationFailed(String),

    #[error("git error: {0}")]
    GitError(String),

    #[error("prompt closed before input was complete")]
    PromptClosed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for branchops domain operations.
pub type Result<T> = std::result::Result<T, BranchOpsError>;
