use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

const DEFAULT_PROGRAM: &str = "rclone";
const DEFAULT_SOURCE_DIR: &str = "db";
const DEFAULT_REMOTE: &str = "gdrive:Data";
const CONFIG_SUBDIR: &str = ".config/cron";
const RECORD_FILE: &str = "pid.json";
const LOG_SUBDIR: &str = "logs";
const LOG_FILE: &str = "background_service.log";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory (HOME is not set)")]
    HomeNotFound,
}

impl ConfigError {
    pub fn suggestion(&self) -> String {
        match self {
            ConfigError::HomeNotFound => {
                "Set HOME, or point CRON_SYNC_HOME at the directory to use.".to_string()
            }
        }
    }
}

/// The external command that mirrors `source` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pub program: String,
    pub source: PathBuf,
    pub destination: String,
}

impl SyncCommand {
    /// Arguments passed to `program`; `progress` appends the `-P` flag.
    pub fn args(&self, progress: bool) -> Vec<String> {
        let mut args = vec![
            "sync".to_string(),
            self.source.display().to_string(),
            self.destination.clone(),
        ];
        if progress {
            args.push("-P".to_string());
        }
        args
    }

    pub fn describe(&self, progress: bool) -> String {
        format!("{} {}", self.program, self.args(progress).join(" "))
    }
}

/// Process-wide settings, resolved once at startup and handed to every
/// component.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub config_dir: PathBuf,
    pub record_path: PathBuf,
    pub log_path: PathBuf,
    pub interval: Duration,
    pub command: SyncCommand,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup, so tests need not
    /// touch the process environment.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup("CRON_SYNC_HOME")
            .or_else(|| lookup("HOME"))
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::HomeNotFound)?;

        let config_dir = lookup("CRON_SYNC_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(CONFIG_SUBDIR));

        // A zero interval would re-run the sync back to back.
        let interval = lookup("CRON_SYNC_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_INTERVAL);

        let command = SyncCommand {
            program: lookup("CRON_SYNC_PROGRAM").unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            source: lookup("CRON_SYNC_SOURCE")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(DEFAULT_SOURCE_DIR)),
            destination: lookup("CRON_SYNC_REMOTE").unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
        };

        Ok(Self::with_config_dir_and(config_dir, interval, command))
    }

    /// A configuration rooted at `config_dir` with the default interval and
    /// sync command.
    pub fn rooted_at(config_dir: impl Into<PathBuf>, home: &Path) -> Self {
        let command = SyncCommand {
            program: DEFAULT_PROGRAM.to_string(),
            source: home.join(DEFAULT_SOURCE_DIR),
            destination: DEFAULT_REMOTE.to_string(),
        };
        Self::with_config_dir_and(config_dir.into(), DEFAULT_INTERVAL, command)
    }

    fn with_config_dir_and(config_dir: PathBuf, interval: Duration, command: SyncCommand) -> Self {
        Self {
            record_path: config_dir.join(RECORD_FILE),
            log_path: config_dir.join(LOG_SUBDIR).join(LOG_FILE),
            config_dir,
            interval,
            command,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
