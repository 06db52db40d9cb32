//! Network interface discovery
//!
//! tc rules are applied to every interface because the agent cannot know
//! which one carries the faulted traffic.

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::shell::Shell;

/// Lists interface statistics and keeps the first column after the 2 header lines
pub const LIST_INTERFACES_CMD: &str = "netstat -i | tail -n+3 | cut -f1 -d ' '";

/// Interface names from the discovery command output, in the order printed
pub fn parse_interfaces(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Discover the host's interfaces. Not cached, every call shells out.
pub async fn discover(shell: &dyn Shell) -> AppResult<Vec<String>> {
    let result = shell.exec(LIST_INTERFACES_CMD).await?;
    if !result.success() {
        return Err(AppError::ShellFailure {
            command: LIST_INTERFACES_CMD.to_string(),
            exit_code: result.exit_code,
            stderr: result.stderr,
        });
    }

    let interfaces = parse_interfaces(&result.stdout);
    debug!("Discovered interfaces: {:?}", interfaces);
    Ok(interfaces)
}
