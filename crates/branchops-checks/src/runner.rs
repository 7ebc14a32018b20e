//! Check execution.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;

/// Captured output of one check invocation.
#[derive(Debug, Clone)]
pub struct CheckOutput {
    /// Exit code (0 = success).
    pub exit_code: i32,

    pub stdout: String,
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Runs check commands in the repository directory.
pub struct CheckRunner;

impl CheckRunner {
    /// Execute a command and capture its output, bounded by `timeout_secs`
    /// when nonzero. A spawn failure or timeout is an `Err`; callers treat
    /// it as a failed check.
    pub async fn execute(
        command: &[String],
        env: &[(String, String)],
        cwd: &Path,
        timeout_secs: u64,
    ) -> anyhow::Result<CheckOutput> {
        let start = Instant::now();

        if command.is_empty() {
            anyhow::bail!("empty check command");
        }

        let exe = &command[0];
        let args = &command[1..];

        let mut cmd = Command::new(exe);
        cmd.args(args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }

        let child = cmd.spawn()?;

        let output = if timeout_secs > 0 {
            tokio::time::timeout(
                std::time::Duration::from_secs(timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| anyhow::anyhow!("'{exe}' timed out after {timeout_secs} seconds"))??
        } else {
            child.wait_with_output().await?
        };

        Ok(CheckOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
