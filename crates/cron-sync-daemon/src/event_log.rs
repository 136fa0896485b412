//! The worker's append-only event log.
//!
//! Every line has the shape `[YYYY-MM-DD HH:MM:SS] message`. Writing never
//! fails from the caller's point of view: if the directory or file cannot be
//! opened the line is dropped, since the worker has no terminal to report to.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_line(at: DateTime<Local>, message: &str) -> String {
    format!("[{}] {}\n", at.format(TIMESTAMP_FORMAT), message)
}

#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, message: &str) {
        self.append(format_line(Local::now(), message).as_bytes());
    }

    fn append(&self, line: &[u8]) {
        let _ = self.try_append(line);
    }

    // One write_all on an O_APPEND descriptor per line keeps concurrent
    // writers from interleaving.
    fn try_append(&self, line: &[u8]) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line)
    }
}

impl Write for EventLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct EventLogWriter<'a> {
    log: &'a EventLog,
}

impl Write for EventLogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for EventLog {
    type Writer = EventLogWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        EventLogWriter { log: self }
    }
}

/// Renders a tracing event as one event-log line: the local timestamp in
/// brackets, the message, then any structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", Local::now().format(TIMESTAMP_FORMAT))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// A subscriber that writes [`LineFormat`] lines to `writer`.
pub fn line_subscriber<W>(writer: W, filter: EnvFilter) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .event_format(LineFormat)
        .with_writer(writer)
        .finish()
}

/// Keeps the background log writer alive; dropping it flushes pending lines.
#[derive(Debug)]
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

fn install<S>(subscriber: S, guard: Option<WorkerGuard>) -> LogGuard
where
    S: Subscriber + Send + Sync + 'static,
{
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return LogGuard { _guard: None };
    }
    LogGuard { _guard: guard }
}

/// The event log records every lifecycle event, so its level is fixed and
/// an inherited `RUST_LOG` cannot silence it.
pub fn event_log_filter() -> EnvFilter {
    EnvFilter::new("info")
}

/// Installs the worker's global subscriber, writing to `log` off the
/// scheduling thread.
pub fn init_worker_tracing(log: EventLog) -> LogGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(log);
    install(line_subscriber(non_blocking, event_log_filter()), Some(guard))
}

/// Installs a subscriber writing event-log lines to stdout, for runs attached
/// to a terminal.
pub fn init_foreground_tracing() -> LogGuard {
    install(line_subscriber(io::stdout, event_log_filter()), None)
}

/// Where the interactive binaries send diagnostics: an event log at the path
/// in `CRON_SYNC_LOG`, or `None` for stderr.
pub fn diagnostics_log<F>(lookup: F) -> Option<EventLog>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("CRON_SYNC_LOG")
        .filter(|path| !path.is_empty())
        .map(EventLog::new)
}

/// Diagnostics for the launcher and the kill utility, whose user-facing
/// output goes to stdout. Filtered by `RUST_LOG`, defaulting to
/// `default_level`.
pub fn init_diagnostics_tracing(default_level: &str) -> LogGuard {
    let filter = env_filter(default_level);

    match diagnostics_log(|key| std::env::var(key).ok()) {
        Some(log) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(log);
            install(line_subscriber(non_blocking, filter), Some(guard))
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr)
                .finish();
            install(subscriber, None)
        }
    }
}
