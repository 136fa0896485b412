//! Invocation of the external sync tool.

use std::process::{Command, Stdio};

use cron_sync_common::SyncCommand;

/// Result of one sync attempt. `output` holds whatever the tool printed,
/// or the reason it could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

impl SyncOutcome {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    pub fn failed(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            output: output.into(),
        }
    }
}

pub trait SyncRunner: Send + Sync {
    /// Human-readable form of the command, for log lines.
    fn describe(&self) -> String;

    /// Runs one sync to completion.
    fn run(&self) -> SyncOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture stdout and stderr for the event log.
    Captured,
    /// Stream to the terminal with the progress flag on.
    Inherited,
}

/// Runs [`SyncCommand`] as a child process.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    command: SyncCommand,
    mode: OutputMode,
}

impl CommandRunner {
    pub fn captured(command: SyncCommand) -> Self {
        Self {
            command,
            mode: OutputMode::Captured,
        }
    }

    pub fn inherited(command: SyncCommand) -> Self {
        Self {
            command,
            mode: OutputMode::Inherited,
        }
    }

    fn progress(&self) -> bool {
        self.mode == OutputMode::Inherited
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(self.command.args(self.progress()))
            .stdin(Stdio::null());
        cmd
    }
}

impl SyncRunner for CommandRunner {
    fn describe(&self) -> String {
        self.command.describe(self.progress())
    }

    fn run(&self) -> SyncOutcome {
        let mut cmd = self.build();

        match self.mode {
            OutputMode::Captured => match cmd.output() {
                Ok(output) => {
                    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                    combined.push_str(&String::from_utf8_lossy(&output.stderr));
                    if output.status.success() {
                        SyncOutcome::succeeded(combined)
                    } else {
                        SyncOutcome::failed(output.status.code(), combined)
                    }
                }
                Err(e) => SyncOutcome::failed(
                    None,
                    format!("failed to start '{}': {}", self.command.program, e),
                ),
            },
            OutputMode::Inherited => match cmd.status() {
                Ok(status) if status.success() => SyncOutcome::succeeded(String::new()),
                Ok(status) => SyncOutcome::failed(status.code(), String::new()),
                Err(e) => SyncOutcome::failed(
                    None,
                    format!("failed to start '{}': {}", self.command.program, e),
                ),
            },
        }
    }
}
