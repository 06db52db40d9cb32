//! Logging setup
//!
//! Everything goes to stdout and `agent.log`; errors are also written to
//! `agent-error.log`, the file the 500 response points operators to.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE: &str = "agent.log";
pub const ERROR_LOG_FILE: &str = "agent-error.log";

/// Open log files, resolved from the first writable candidate directory
pub struct LogFiles {
    pub dir: PathBuf,
    pub log: File,
    pub error_log: File,
}

/// Candidate directories: the configured one, then `$HOME/.saboteur`, then `.`
pub fn candidate_dirs(configured: &str) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(configured)];
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(Path::new(&home).join(".saboteur"));
    }
    dirs.push(PathBuf::from("."));
    dirs
}

fn open_in(dir: &Path) -> std::io::Result<LogFiles> {
    fs::create_dir_all(dir)?;
    let open = |name: &str| OpenOptions::new().create(true).append(true).open(dir.join(name));
    Ok(LogFiles {
        dir: dir.to_path_buf(),
        log: open(LOG_FILE)?,
        error_log: open(ERROR_LOG_FILE)?,
    })
}

pub fn open_log_files(candidates: &[PathBuf]) -> Option<LogFiles> {
    candidates.iter().find_map(|dir| open_in(dir).ok())
}

/// Install the global subscriber. Returns the directory logs are written to,
/// or `None` when only stdout is available.
pub fn init(log_dir: &str) -> Option<PathBuf> {
    let files = open_log_files(&candidate_dirs(log_dir));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, error_layer, dir) = match files {
        Some(files) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(files.log)),
            ),
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(files.error_log))
                    .with_filter(LevelFilter::ERROR),
            ),
            Some(files.dir),
        ),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(file_layer)
        .with(error_layer)
        .init();

    match &dir {
        Some(dir) => tracing::info!("Logging to {}", dir.display()),
        None => tracing::warn!("No writable log directory, logging to stdout only"),
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_start_with_configured_dir() {
        let dirs = candidate_dirs("/var/log/saboteur");
        assert_eq!(dirs[0], PathBuf::from("/var/log/saboteur"));
        assert_eq!(dirs.last(), Some(&PathBuf::from(".")));
    }

    #[test]
    fn test_falls_back_to_next_candidate() {
        let writable = std::env::temp_dir().join(format!("saboteur-log-{}", std::process::id()));
        let candidates = vec![
            PathBuf::from("/proc/saboteur-cannot-exist"),
            writable.clone(),
        ];

        let files = open_log_files(&candidates).unwrap();
        assert_eq!(files.dir, writable);
        assert!(writable.join(LOG_FILE).exists());
        assert!(writable.join(ERROR_LOG_FILE).exists());

        fs::remove_dir_all(&writable).ok();
    }
}
