//! Signal handling for graceful worker shutdown.
//!
//! SIGINT and SIGTERM are turned into a single shutdown request on the
//! scheduler's shutdown channel.

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::thread::{self, JoinHandle};
use tracing::info;

use crate::error::DaemonError;
use crate::shutdown::ShutdownTrigger;

/// Listens for termination signals for the lifetime of the process.
pub struct SignalHandler {
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl SignalHandler {
    /// Set up signal handling for graceful shutdown.
    ///
    /// Every SIGINT or SIGTERM is logged and fires `trigger`; only the first
    /// one reaches the scheduler. The signals stay registered after that so a
    /// repeated Ctrl+C cannot kill the worker before it removes its record.
    pub fn setup(trigger: ShutdownTrigger) -> Result<Self, DaemonError> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;

        let handle = thread::Builder::new()
            .name("signal-handler".to_string())
            .spawn(move || {
                for sig in signals.forever() {
                    info!(signal = sig, "Termination signal received");
                    trigger.fire();
                }
            })
            .map_err(|e| {
                DaemonError::SignalSetup(format!("failed to spawn signal handler: {}", e))
            })?;

        Ok(Self { handle })
    }
}
