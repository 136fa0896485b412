//! The cron-sync background worker.
//!
//! Runs the sync command on a fixed interval, records its own PID while
//! alive, and shuts down cleanly on SIGINT/SIGTERM.

#![deny(clippy::all)]

mod error;
mod event_log;
mod runner;
mod scheduler;
mod shutdown;
#[cfg(unix)]
mod signal_handler;
mod worker;

pub use error::DaemonError;
pub use event_log::EventLog;
pub use event_log::LineFormat;
pub use event_log::LogGuard;
pub use event_log::env_filter;
pub use event_log::format_line;
pub use event_log::init_diagnostics_tracing;
pub use event_log::init_foreground_tracing;
pub use event_log::init_worker_tracing;
pub use event_log::line_subscriber;
pub use runner::CommandRunner;
pub use runner::OutputMode;
pub use runner::SyncOutcome;
pub use runner::SyncRunner;
pub use scheduler::LoopSummary;
pub use scheduler::Scheduler;
pub use shutdown::ShutdownListener;
pub use shutdown::ShutdownTrigger;
pub use shutdown::WaitOutcome;
pub use shutdown::shutdown_channel;
#[cfg(unix)]
pub use signal_handler::SignalHandler;
pub use worker::run_foreground;
pub use worker::run_worker;
