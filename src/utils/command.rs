//! Utilities for running external commands with proper error handling and timeouts

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::{debug, error};

/// Locate an executable on PATH
pub fn find_program(program: &str) -> Result<PathBuf> {
    which::which(program).with_context(|| {
        format!(
            "{} executable not found in PATH. Please ensure it is installed.",
            program
        )
    })
}

/// Run a command with extra environment variables and an optional timeout
///
/// Environment values are passed to the child only; they are never logged.
pub fn run_command(
    program: &str,
    args: &[&str],
    env: &[(String, String)],
    timeout: Option<Duration>,
) -> Result<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    for (key, value) in env {
        cmd.env(key, value);
    }

    debug!("Running command: {} {}", program, args.join(" "));

    let output = if let Some(timeout_duration) = timeout {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime for command timeout")?;

        runtime.block_on(async {
            let mut child = tokio::process::Command::from(cmd);
            child.kill_on_drop(true);
            let result = tokio::time::timeout(timeout_duration, child.output()).await;

            match result {
                Ok(output) => output.context(format!("Failed to execute {}", program)),
                Err(_) => Err(anyhow::anyhow!(
                    "{} timed out after {:?}",
                    program,
                    timeout_duration
                )),
            }
        })?
    } else {
        cmd.output()
            .context(format!("Failed to execute {}", program))?
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("Command failed: {} {}", program, args.join(" "));
        error!("Stderr: {}", stderr);
        anyhow::bail!(
            "{} failed with exit code {:?}: {}",
            program,
            output.status.code(),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
        debug!("Command output: {}", stdout);
    }

    Ok(output)
}
