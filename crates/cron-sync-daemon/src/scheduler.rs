//! The fixed-interval sync loop.

use std::time::Duration;

use chrono::{DateTime, Local};
use cron_sync_common::{Clock, ProcessRegistry};
use tracing::{info, warn};

use crate::runner::{SyncOutcome, SyncRunner};
use crate::shutdown::{ShutdownListener, WaitOutcome};

/// What a loop did before it was told to stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub iterations: u64,
    pub failures: u64,
    pub last_next_run: Option<DateTime<Local>>,
}

pub struct Scheduler<'a> {
    runner: &'a dyn SyncRunner,
    clock: &'a dyn Clock,
    interval: Duration,
    registry: Option<&'a ProcessRegistry>,
}

impl<'a> Scheduler<'a> {
    pub fn new(runner: &'a dyn SyncRunner, clock: &'a dyn Clock, interval: Duration) -> Self {
        Self {
            runner,
            clock,
            interval,
            registry: None,
        }
    }

    /// Removes the registry's record when the loop shuts down.
    pub fn with_registry(mut self, registry: &'a ProcessRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn next_run_after(&self, at: DateTime<Local>) -> DateTime<Local> {
        chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|step| at.checked_add_signed(step))
            .unwrap_or(at)
    }

    /// Runs until `shutdown` fires. The first sync starts immediately; a
    /// shutdown request that arrives mid-sync is seen once the sync returns.
    pub fn run(&self, shutdown: &ShutdownListener) -> LoopSummary {
        let mut summary = LoopSummary::default();

        loop {
            summary.iterations += 1;
            if !self.run_once().success {
                summary.failures += 1;
            }

            let next_run = self.next_run_after(self.clock.now());
            info!("Next sync scheduled for: {}", next_run.format("%H:%M:%S"));
            summary.last_next_run = Some(next_run);

            match shutdown.wait(self.interval) {
                WaitOutcome::Elapsed => continue,
                WaitOutcome::Shutdown => {
                    info!("Background service shutting down");
                    self.release_record();
                    return summary;
                }
            }
        }
    }

    fn run_once(&self) -> SyncOutcome {
        info!("Starting {}", self.runner.describe());

        let outcome = self.runner.run();
        if outcome.success {
            info!("Sync completed successfully");
        } else {
            match outcome.exit_code {
                Some(code) => warn!("Error executing sync command: exit status {}", code),
                None => warn!("Error executing sync command"),
            }
        }

        for line in outcome.output.lines().filter(|line| !line.trim().is_empty()) {
            info!("{}", line.trim_end());
        }

        outcome
    }

    fn release_record(&self) {
        let Some(registry) = self.registry else {
            return;
        };

        match registry.remove() {
            Ok(()) => info!("PID file removed: {}", registry.path().display()),
            Err(e) => warn!("Error removing PID file: {}", e),
        }
    }
}
