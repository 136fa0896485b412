//! Launcher and kill utility for the cron-sync background worker.

#![deny(clippy::all)]

pub mod cli;
pub mod controller;
pub mod error;
pub mod launcher;
pub mod process;
pub mod prompt;
pub mod sleeper;

pub use controller::ControlOutcome;
pub use controller::Controller;
pub use error::ControlError;
pub use error::LaunchError;
pub use process::ProcessController;
pub use process::SystemKill;
pub use process::UnixProcessController;
pub use prompt::Prompt;
pub use sleeper::RealSleeper;
