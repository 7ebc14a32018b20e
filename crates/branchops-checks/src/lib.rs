//! branchops checks - pre-push quality gates
//!
//! Provides the check pipeline that gates pushes:
//! - Builds an ordered check list from configuration and the change set
//! - Executes external tools with captured output and bounded timeouts
//! - Classifies free-form tool reports into pass/fail, failing safe
//! - Aggregates a go/no-go verdict with fail-fast semantics

pub mod check;
pub mod classify;
pub mod gate;
pub mod pipeline;
pub mod runner;

// Re-export key types
pub use check::{build_checks, build_setup_steps, BuiltinCheck, CheckDefinition, FastPath};
pub use classify::OutputClassifier;
pub use gate::{CheckOutcome, CheckResult, PipelineResult};
pub use pipeline::{CheckPipeline, PipelineOptions};
pub use runner::{CheckOutput, CheckRunner};
