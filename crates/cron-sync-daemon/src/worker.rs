//! Entry points for the long-running modes.

use cron_sync_common::{ProcessRecord, ProcessRegistry, SyncConfig, SystemClock};
use tracing::{error, info, warn};

use crate::runner::CommandRunner;
use crate::scheduler::{LoopSummary, Scheduler};
use crate::shutdown::{ShutdownTrigger, shutdown_channel};
#[cfg(unix)]
use crate::signal_handler::SignalHandler;

/// Runs as the detached background worker until SIGINT or SIGTERM.
///
/// Signal handling is in place before the record is written, so once the
/// record exists a termination signal always reaches the scheduler. Failing
/// to write the record only costs the controller its ability to find us.
pub fn run_worker(config: &SyncConfig) -> LoopSummary {
    let (trigger, listener) = shutdown_channel();
    let _signals = install_signal_handler(trigger);

    let registry = ProcessRegistry::new(&config.record_path);
    match registry.save(&ProcessRecord::current()) {
        Ok(()) => info!("PID information saved to {}", registry.path().display()),
        Err(e) => warn!("Error saving PID information: {}", e),
    }

    info!("Background service started");

    let runner = CommandRunner::captured(config.command.clone());
    let clock = SystemClock;
    Scheduler::new(&runner, &clock, config.interval)
        .with_registry(&registry)
        .run(&listener)
}

/// Runs the same schedule attached to the terminal, streaming the sync
/// tool's progress. Nothing is recorded in the registry.
pub fn run_foreground(config: &SyncConfig) -> LoopSummary {
    let (trigger, listener) = shutdown_channel();
    let _signals = install_signal_handler(trigger);

    let runner = CommandRunner::inherited(config.command.clone());
    let clock = SystemClock;
    Scheduler::new(&runner, &clock, config.interval).run(&listener)
}

#[cfg(unix)]
fn install_signal_handler(trigger: ShutdownTrigger) -> Option<SignalHandler> {
    match SignalHandler::setup(trigger) {
        Ok(handler) => Some(handler),
        Err(e) => {
            error!("{}. {}", e, e.suggestion());
            None
        }
    }
}

#[cfg(not(unix))]
fn install_signal_handler(_trigger: ShutdownTrigger) -> Option<()> {
    None
}
