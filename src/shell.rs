//! Shell execution
//!
//! Runs fully formed command strings through `sh -c` and captures their
//! outcome. Non-zero exits are returned, not raised; `run_all` applies the
//! fail-fast or best-effort policy on top.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};

/// Exit code recorded for a command whose process never started
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// Outcome of a single shell command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// How a command sequence reacts to a non-zero exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecPolicy {
    /// Stop at the first failing command and report it
    FailFast,
    /// Run everything, only log failures
    IgnoreErrors,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Shell: Send + Sync {
    /// Execute one command. Errors only when the process cannot be spawned.
    async fn exec(&self, command: &str) -> AppResult<CommandResult>;
}

/// Executes commands on the host with `sh -c`
#[derive(Debug, Clone, Default)]
pub struct SystemShell;

#[async_trait]
impl Shell for SystemShell {
    async fn exec(&self, command: &str) -> AppResult<CommandResult> {
        info!("Executing: {}", command);

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AppError::internal(&format!("Failed to spawn `{}`: {}", command, e)))?;

        let result = CommandResult {
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.stdout.is_empty() {
            debug!("stdout: {}", result.stdout.trim_end());
        }
        if !result.stderr.is_empty() {
            warn!("stderr: {}", result.stderr.trim_end());
        }

        Ok(result)
    }
}

/// Run `commands` in order under `policy`.
///
/// With `FailFast` the first non-zero exit aborts the sequence with
/// `AppError::ShellFailure`; commands already applied are left in place.
/// With `IgnoreErrors` a command that cannot even be spawned is recorded as
/// exit code -1 and the sequence carries on.
pub async fn run_all(
    shell: &dyn Shell,
    commands: &[String],
    policy: ExecPolicy,
) -> AppResult<Vec<CommandResult>> {
    let mut results = Vec::with_capacity(commands.len());
    for command in commands {
        let result = match shell.exec(command).await {
            Ok(result) => result,
            Err(e) if policy == ExecPolicy::IgnoreErrors => {
                warn!("Could not run `{}`: {}", command, e);
                CommandResult {
                    exit_code: SPAWN_FAILURE_EXIT_CODE,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
            Err(e) => return Err(e),
        };
        if !result.success() {
            match policy {
                ExecPolicy::FailFast => {
                    error!(
                        "Command `{}` failed with exit code {}: {}",
                        command,
                        result.exit_code,
                        result.stderr.trim_end()
                    );
                    return Err(AppError::ShellFailure {
                        command: command.clone(),
                        exit_code: result.exit_code,
                        stderr: result.stderr,
                    });
                }
                ExecPolicy::IgnoreErrors => {
                    debug!(
                        "Ignoring exit code {} from `{}`",
                        result.exit_code, command
                    );
                }
            }
        }
        results.push(result);
    }
    Ok(results)
}
