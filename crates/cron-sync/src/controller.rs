//! Interactive termination of the background worker.
//!
//! The controller walks a fixed sequence: load the record, confirm, send
//! SIGTERM, escalate to SIGKILL and then to the system `kill -9` only when
//! the operator agrees, and finally offer to delete a record the worker
//! failed to clean up. Every collaborator is injected so each branch can be
//! driven without a terminal or a real process.

use std::io::{BufRead, Write};
use std::time::Duration;

use chrono::TimeDelta;
use cron_sync_common::{Clock, Colors, ProcessRecord, ProcessRegistry, RegistryError};
use tracing::debug;

use crate::error::ControlError;
use crate::process::{KillCommand, ProcessController, ProcessStatus, Signal};
use crate::prompt::Prompt;
use crate::sleeper::Sleeper;

/// Time the worker gets to exit after SIGTERM before it is probed.
pub const TERMINATION_GRACE: Duration = Duration::from_secs(2);
/// Extra delay before checking whether the worker removed its record.
pub const RECORD_CHECK_DELAY: Duration = Duration::from_secs(1);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Graceful,
    StillRunning,
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCleanup {
    AlreadyRemoved,
    Removed,
    Kept,
    RemoveFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    NotRunning,
    Cancelled,
    NotTerminated,
    ManualInterventionRequired,
    Finished {
        termination: Termination,
        record: RecordCleanup,
    },
}

#[derive(Debug)]
enum ControlState {
    AwaitRecord,
    AwaitConfirm(ProcessRecord),
    AwaitForceConfirm(ProcessRecord),
    AwaitCleanupConfirm(Termination),
    Done(ControlOutcome),
}

/// Formats an elapsed time like `1h2m3s`, rounded to whole seconds.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let secs = (elapsed.num_milliseconds() + 500).div_euclid(1000).max(0);
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

pub struct Controller<'a> {
    registry: &'a ProcessRegistry,
    processes: &'a dyn ProcessController,
    kill_command: &'a dyn KillCommand,
    sleeper: &'a dyn Sleeper,
    clock: &'a dyn Clock,
}

impl<'a> Controller<'a> {
    pub fn new(
        registry: &'a ProcessRegistry,
        processes: &'a dyn ProcessController,
        kill_command: &'a dyn KillCommand,
        sleeper: &'a dyn Sleeper,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            registry,
            processes,
            kill_command,
            sleeper,
            clock,
        }
    }

    pub fn run<R: BufRead, W: Write>(
        &self,
        prompt: &mut Prompt<R, W>,
    ) -> Result<ControlOutcome, ControlError> {
        let mut state = ControlState::AwaitRecord;

        loop {
            debug!(?state, "controller step");
            state = match state {
                ControlState::AwaitRecord => self.load_record(prompt)?,
                ControlState::AwaitConfirm(record) => self.terminate(prompt, record)?,
                ControlState::AwaitForceConfirm(record) => self.force_terminate(prompt, record)?,
                ControlState::AwaitCleanupConfirm(termination) => {
                    self.clean_up_record(prompt, termination)?
                }
                ControlState::Done(outcome) => return Ok(outcome),
            };
        }
    }

    fn load_record<R: BufRead, W: Write>(
        &self,
        prompt: &mut Prompt<R, W>,
    ) -> Result<ControlState, ControlError> {
        let record = match self.registry.load() {
            Ok(record) => record,
            Err(RegistryError::NotFound(_)) => {
                prompt.say("No background service seems to be running (PID file not found)")?;
                return Ok(ControlState::Done(ControlOutcome::NotRunning));
            }
            Err(e) => return Err(e.into()),
        };

        prompt.say(format!("Found process with PID: {}", Colors::pid(record.pid)))?;
        prompt.say(format!(
            "Process started at: {}",
            record.start_time.format(TIMESTAMP_FORMAT)
        ))?;
        prompt.say(format!(
            "Process running for: {}",
            format_elapsed(self.clock.now() - record.start_time)
        ))?;

        Ok(ControlState::AwaitConfirm(record))
    }

    fn terminate<R: BufRead, W: Write>(
        &self,
        prompt: &mut Prompt<R, W>,
        record: ProcessRecord,
    ) -> Result<ControlState, ControlError> {
        if !prompt.confirm("Do you want to terminate this process?")? {
            prompt.say("Operation cancelled")?;
            return Ok(ControlState::Done(ControlOutcome::Cancelled));
        }

        let pid = record.pid;
        prompt.say(format!("Sending termination signal to process {}...", pid))?;

        if let Err(e) = self.processes.send_signal(pid, Signal::Term) {
            debug!(pid, error = %e, "SIGTERM failed");
            prompt.say(format!(
                "{} {}",
                Colors::error("Error sending termination signal:"),
                e
            ))?;
            return Ok(ControlState::AwaitForceConfirm(record));
        }

        prompt.say(format!("Termination signal sent to process {}", pid))?;
        self.sleeper.sleep(TERMINATION_GRACE);

        let termination = match self.processes.check_process(pid) {
            Ok(ProcessStatus::NotFound) => {
                prompt.say(Colors::success("Process has been terminated successfully"))?;
                Termination::Graceful
            }
            _ => {
                prompt.say("Process is still running. It may take a moment to shut down properly.")?;
                Termination::StillRunning
            }
        };

        Ok(ControlState::AwaitCleanupConfirm(termination))
    }

    fn force_terminate<R: BufRead, W: Write>(
        &self,
        prompt: &mut Prompt<R, W>,
        record: ProcessRecord,
    ) -> Result<ControlState, ControlError> {
        if !prompt.confirm("Terminate forcefully?")? {
            prompt.say("Process was not terminated")?;
            return Ok(ControlState::Done(ControlOutcome::NotTerminated));
        }

        let pid = record.pid;
        if let Err(e) = self.processes.send_signal(pid, Signal::Kill) {
            debug!(pid, error = %e, "SIGKILL failed");
            prompt.say(format!(
                "{} {}",
                Colors::error("Error forcefully terminating process:"),
                e
            ))?;
            prompt.say("Attempting to terminate with system kill command...")?;

            if let Err(reason) = self.kill_command.force_kill(pid) {
                prompt.say(format!("{} {}", Colors::error("Failed to force kill:"), reason))?;
                prompt.say(Colors::warning("You may need to manually kill the process"))?;
                return Ok(ControlState::Done(
                    ControlOutcome::ManualInterventionRequired,
                ));
            }
        }

        prompt.say(format!("Process {} has been forcefully terminated", pid))?;
        Ok(ControlState::AwaitCleanupConfirm(Termination::Forced))
    }

    fn clean_up_record<R: BufRead, W: Write>(
        &self,
        prompt: &mut Prompt<R, W>,
        termination: Termination,
    ) -> Result<ControlState, ControlError> {
        let finished = |record| {
            Ok(ControlState::Done(ControlOutcome::Finished {
                termination,
                record,
            }))
        };

        self.sleeper.sleep(RECORD_CHECK_DELAY);
        if !self.registry.exists() {
            return finished(RecordCleanup::AlreadyRemoved);
        }

        prompt.say(Colors::warning(
            "Note: PID file still exists. This might indicate the process didn't shut down properly.",
        ))?;
        if !prompt.confirm("Remove the PID file?")? {
            return finished(RecordCleanup::Kept);
        }

        match self.registry.remove() {
            Ok(()) => {
                prompt.say(Colors::success("PID file removed successfully"))?;
                finished(RecordCleanup::Removed)
            }
            Err(RegistryError::NotFound(_)) => finished(RecordCleanup::AlreadyRemoved),
            Err(e) => {
                prompt.say(format!("{} {}", Colors::error("Error removing PID file:"), e))?;
                finished(RecordCleanup::RemoveFailed)
            }
        }
    }
}
