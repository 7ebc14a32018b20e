//! branchops - git branch workflow CLI
//!
//! The `branchops` command wraps the day-to-day branch workflow:
//!
//! - `new`: create a conventionally named feature branch off the trunk
//! - `checkout` / `delete`: find a branch by substring and switch/remove
//! - `prune`: delete merged (or pattern-matched) branches
//! - `commit` / `amend`: guarded commits with ticket links
//! - `push` / `ship`: run the quality gates, then push
//! - `rebase` / `reset`: rebase on trunk, drop back one commit

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, Level};

use branchops_checks::{
    build_checks, build_setup_steps, CheckOutcome, CheckPipeline, PipelineOptions, PipelineResult,
};
use branchops_core::{
    decide_mode, init_tracing, push, BranchLifecycle, BranchOpsError, Config, ProcessGitRunner,
    Reporter, StdinPrompt,
};

#[derive(Parser)]
#[command(name = "branchops")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Git branch workflow orchestration", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "BRANCHOPS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new feature branch off an up-to-date trunk
    New,

    /// Switch to the branch matching a substring
    Checkout {
        /// Substring of the branch name
        fragment: String,
    },

    /// Force-delete the branch matching a substring
    Delete {
        /// Substring of the branch name
        fragment: String,
    },

    /// Delete merged branches, or branches matching the given patterns
    Prune {
        /// Case-insensitive substrings; with none, merged branches are pruned
        patterns: Vec<String>,
    },

    /// Commit all pending work with a guarded, ticket-linked message
    Commit,

    /// Fold pending changes into the previous commit
    Amend,

    /// Run the quality gates, then push HEAD to origin
    Push {
        #[command(flatten)]
        flags: CheckFlags,
    },

    /// Amend the previous commit, run the quality gates, and force-push
    Ship {
        #[command(flatten)]
        flags: CheckFlags,
    },

    /// Run the quality gates without pushing
    Validate {
        #[command(flatten)]
        flags: CheckFlags,
    },

    /// Rebase the current branch on an up-to-date trunk
    Rebase,

    /// Soft-reset to the previous commit
    Reset,
}

#[derive(Args, Clone, Copy, Default)]
struct CheckFlags {
    /// Run language checks even when nothing relevant changed; force-push
    #[arg(short, long)]
    force: bool,

    /// Skip every check
    #[arg(short = 'S', long)]
    skip_validations: bool,

    /// Skip the style check
    #[arg(long)]
    skip_rubocop: bool,

    /// Skip the security scan
    #[arg(long)]
    skip_brakeman: bool,

    /// Skip the test run
    #[arg(long)]
    skip_rspec: bool,

    /// Skip the javascript lint
    #[arg(long)]
    skip_lint: bool,
}

impl From<CheckFlags> for PipelineOptions {
    fn from(flags: CheckFlags) -> Self {
        Self {
            force: flags.force,
            skip_all: flags.skip_validations,
            skip_rubocop: flags.skip_rubocop,
            skip_brakeman: flags.skip_brakeman,
            skip_rspec: flags.skip_rspec,
            skip_lint: flags.skip_lint,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(cli).await {
        Ok(()) => {}
        Err(e) => {
            // Configuration may be the thing that failed, so color codes are
            // not guaranteed here.
            eprintln!("--ERROR: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let git = ProcessGitRunner::new(&config.repo_path);
    let reporter = Reporter::new(config.colors.clone());
    let lifecycle = BranchLifecycle::new(&git, &config);
    let mut prompt = StdinPrompt::new();

    match cli.command {
        Commands::New => {
            let name = lifecycle.create(&mut prompt, &reporter)?;
            reporter.success(&format!("Switched to a new branch '{name}'"));
            sync_environment(&config, &lifecycle, &reporter).await?;
        }

        Commands::Checkout { fragment } => {
            let target = lifecycle.checkout_by_substring(&fragment)?;
            reporter.success(&format!("Switched to branch '{target}'"));
        }

        Commands::Delete { fragment } => {
            let target = lifecycle.delete_by_substring(&fragment)?;
            reporter.success(&format!("Deleted branch '{target}'"));
        }

        Commands::Prune { patterns } => {
            let deleted = lifecycle.prune(&patterns)?;
            if deleted.is_empty() {
                reporter.success("Nothing to prune");
            } else {
                for name in &deleted {
                    reporter.success(&format!("Deleted branch '{name}'"));
                }
            }
        }

        Commands::Commit => {
            lifecycle.commit(&mut prompt, &reporter)?;
            reporter.success("Work committed");
        }

        Commands::Amend => {
            lifecycle.amend()?;
            reporter.success("Amended with recent changes!");
        }

        Commands::Push { flags } => {
            run_gates(&config, &lifecycle, &reporter, flags).await?;
            push_head(&git, &reporter, flags.force, false)?;
        }

        Commands::Ship { flags } => {
            run_gates(&config, &lifecycle, &reporter, flags).await?;
            lifecycle.amend()?;
            reporter.success("Amended with recent changes!");
            push_head(&git, &reporter, flags.force, true)?;
        }

        Commands::Validate { flags } => {
            run_gates(&config, &lifecycle, &reporter, flags).await?;
        }

        Commands::Rebase => {
            let branch = lifecycle.rebase_on_main()?;
            reporter.success(&format!(
                "Rebased '{branch}' successfully on '{}'",
                config.main_branch
            ));
        }

        Commands::Reset => {
            let subject = lifecycle.reset_to_previous_commit()?;
            reporter.success(&format!("Reset to the previous commit with subject: {subject}"));
        }
    }

    Ok(())
}

/// Classify the working tree, run the check pipeline, and report per-check
/// results. A failed check aborts the whole operation.
async fn run_gates(
    config: &Config,
    lifecycle: &BranchLifecycle<'_, ProcessGitRunner>,
    reporter: &Reporter,
    flags: CheckFlags,
) -> Result<()> {
    let changeset = lifecycle.changeset()?;
    debug!(?changeset, "classified working tree");

    let options = PipelineOptions::from(flags);
    let checks = build_checks(config, &changeset, &options, &config.repo_path);
    let enabled = checks.iter().filter(|c| c.enabled).count();
    if enabled > 0 {
        reporter.warning(&format!("Running {enabled} check(s)..."));
    }

    let result = CheckPipeline::run(checks, &config.repo_path).await;
    report_pipeline(reporter, &result)?;
    reporter.success("All checks pass! ✅");
    Ok(())
}

/// Bring the fresh branch's environment in sync with the pulled trunk, then
/// drop the file churn the tools leave behind.
async fn sync_environment(
    config: &Config,
    lifecycle: &BranchLifecycle<'_, ProcessGitRunner>,
    reporter: &Reporter,
) -> Result<()> {
    let steps = build_setup_steps(config);
    reporter.warning(&format!("Syncing environment ({} step(s))...", steps.len()));
    let result = CheckPipeline::run(steps, &config.repo_path).await;
    report_pipeline(reporter, &result)?;
    lifecycle.drop_working_changes()?;
    reporter.success("Environment synced");
    Ok(())
}

fn report_pipeline(reporter: &Reporter, result: &PipelineResult) -> Result<()> {
    for check in &result.results {
        match check.outcome {
            CheckOutcome::Skipped => {
                debug!(check = %check.name, reason = %check.message, "check skipped");
            }
            CheckOutcome::Passed => {
                reporter.excerpt(&check.message);
                reporter.success(&format!("{} passed!", humanize(&check.name)));
            }
            CheckOutcome::Failed => {
                reporter.excerpt(&check.message);
                reporter.error(&format!("{} failed!", humanize(&check.name)));
                return Err(BranchOpsError::GateFailed {
                    name: check.name.clone(),
                    excerpt: check.message.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn push_head(
    git: &ProcessGitRunner,
    reporter: &Reporter,
    force: bool,
    amend_flow: bool,
) -> Result<()> {
    let mode = decide_mode(force, amend_flow);
    let outcome = push(git, mode)?;
    if let Some(advisory) = &outcome.advisory {
        reporter.warning(advisory);
    }
    reporter.excerpt(&outcome.summary);
    reporter.success("Pushed work!");
    Ok(())
}

/// "yarn_lint" -> "Yarn lint".
fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

fn default_config_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".config").join("branchops").join("config.yml")
}
