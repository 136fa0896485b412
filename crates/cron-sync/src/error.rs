//! Errors surfaced by the launcher and the kill utility.
//!
//! Both binaries print the message, a suggestion, and exit with status 1.

use cron_sync_common::{ConfigError, RegistryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Error getting executable path: {0}")]
    ExecutablePath(String),
    #[error("Error starting daemon process: {0}")]
    Spawn(String),
    #[error("A background service is already running (PID {0})")]
    AlreadyRunning(u32),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl LaunchError {
    pub fn suggestion(&self) -> String {
        match self {
            LaunchError::Config(e) => e.suggestion(),
            LaunchError::ExecutablePath(_) => {
                "Run cron-sync from an installed location rather than a deleted build.".to_string()
            }
            LaunchError::Spawn(_) => {
                "Check that the cron-sync executable is readable and executable.".to_string()
            }
            LaunchError::AlreadyRunning(_) => {
                "Stop it first with 'cron-sync-kill', or leave it running.".to_string()
            }
            LaunchError::Io(_) => "Check that standard output is writable.".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Error reading PID file: {0}")]
    Registry(#[from] RegistryError),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ControlError {
    pub fn suggestion(&self) -> String {
        match self {
            ControlError::Config(e) => e.suggestion(),
            ControlError::Registry(e) => e.suggestion(),
            ControlError::Io(_) => "Run cron-sync-kill from an interactive terminal.".to_string(),
        }
    }
}
