//! Worker lifecycle errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Failed to setup signal handler: {0}")]
    SignalSetup(String),
}

impl DaemonError {
    /// Returns a helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> String {
        match self {
            DaemonError::SignalSetup(_) => {
                "The worker keeps syncing but cannot shut down gracefully; stop it with 'cron-sync-kill'."
                    .to_string()
            }
        }
    }
}
