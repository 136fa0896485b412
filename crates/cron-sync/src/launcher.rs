//! Starting the background worker from an interactive shell.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use cron_sync_common::{Colors, ProcessRegistry, RegistryError, SyncConfig};
use tracing::{debug, warn};

use crate::error::LaunchError;
use crate::process::{ProcessController, ProcessStatus};

/// Marker argument that makes the executable run as the worker.
pub const WORKER_FLAG: &str = "--daemon";

/// What the launcher found in the registry before spawning.
#[derive(Debug)]
pub enum Preflight {
    Clear,
    StaleRecord(u32),
    UnreadableRecord(RegistryError),
}

/// Refuses to start a second worker while the recorded one is alive.
///
/// A record whose process is gone, or that cannot be parsed, does not block
/// the launch; the new worker overwrites it.
pub fn check_existing(
    registry: &ProcessRegistry,
    processes: &dyn ProcessController,
) -> Result<Preflight, LaunchError> {
    let record = match registry.load() {
        Ok(record) => record,
        Err(RegistryError::NotFound(_)) => return Ok(Preflight::Clear),
        Err(e) => return Ok(Preflight::UnreadableRecord(e)),
    };

    match processes.check_process(record.pid) {
        Ok(ProcessStatus::Running) | Ok(ProcessStatus::NoPermission) => {
            Err(LaunchError::AlreadyRunning(record.pid))
        }
        Ok(ProcessStatus::NotFound) => Ok(Preflight::StaleRecord(record.pid)),
        Err(e) => {
            warn!(pid = record.pid, error = %e, "Could not probe recorded process");
            Ok(Preflight::StaleRecord(record.pid))
        }
    }
}

/// Spawns `exe` as the worker in its own session with null stdio and
/// returns its PID without waiting for it.
pub fn spawn_worker(exe: &Path) -> Result<u32, LaunchError> {
    let mut cmd = Command::new(exe);
    cmd.arg(WORKER_FLAG)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    let child = cmd
        .spawn()
        .map_err(|e| LaunchError::Spawn(e.to_string()))?;
    debug!(pid = child.id(), exe = %exe.display(), "worker spawned");
    Ok(child.id())
}

pub fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} seconds", secs)
    }
}

/// Runs the launcher role and returns the worker's PID.
pub fn launch<W: Write>(
    config: &SyncConfig,
    processes: &dyn ProcessController,
    out: &mut W,
) -> Result<u32, LaunchError> {
    let registry = ProcessRegistry::new(&config.record_path);
    match check_existing(&registry, processes)? {
        Preflight::Clear => {}
        Preflight::StaleRecord(pid) => writeln!(
            out,
            "{}",
            Colors::warning(&format!(
                "Replacing stale PID file left by process {} (no longer running)",
                pid
            ))
        )?,
        Preflight::UnreadableRecord(e) => writeln!(
            out,
            "{} {}",
            Colors::warning("Ignoring unreadable PID file:"),
            e
        )?,
    }

    writeln!(
        out,
        "Starting scheduled sync, will run every {}",
        describe_interval(config.interval)
    )?;

    let exe = std::env::current_exe().map_err(|e| LaunchError::ExecutablePath(e.to_string()))?;
    let pid = spawn_worker(&exe)?;

    writeln!(out, "Process ID: {}", Colors::pid(pid))?;
    writeln!(out)?;
    writeln!(out, "--- Program is continuing in background services ---")?;
    Ok(pid)
}
