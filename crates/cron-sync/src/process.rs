//! Probing and signalling another process by PID.

use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Term,
    Kill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    NotFound,
    NoPermission,
}

pub trait ProcessController: Send + Sync {
    fn check_process(&self, pid: u32) -> Result<ProcessStatus, std::io::Error>;

    fn send_signal(&self, pid: u32, signal: Signal) -> Result<(), std::io::Error>;
}

/// PIDs that address a single process. `kill(2)` treats 0 and negative
/// values as process groups, so those are refused outright.
fn to_pid_t(pid: u32) -> Result<libc::pid_t, std::io::Error> {
    match libc::pid_t::try_from(pid) {
        Ok(pid_t) if pid_t > 0 => Ok(pid_t),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "PID out of range",
        )),
    }
}

pub struct UnixProcessController;

impl ProcessController for UnixProcessController {
    fn check_process(&self, pid: u32) -> Result<ProcessStatus, std::io::Error> {
        let pid_t = to_pid_t(pid)?;

        // SAFETY: signal 0 performs only the existence and permission checks.
        let result = unsafe { libc::kill(pid_t, 0) };
        if result == 0 {
            return Ok(ProcessStatus::Running);
        }

        let err = std::io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Ok(ProcessStatus::NotFound),
            Some(libc::EPERM) => Ok(ProcessStatus::NoPermission),
            _ => Err(err),
        }
    }

    fn send_signal(&self, pid: u32, signal: Signal) -> Result<(), std::io::Error> {
        let pid_t = to_pid_t(pid)?;

        let sig = match signal {
            Signal::Term => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        };

        // SAFETY: kill has no memory-safety preconditions.
        let result = unsafe { libc::kill(pid_t, sig) };
        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// Last-resort termination through an external `kill` executable.
pub trait KillCommand: Send + Sync {
    fn force_kill(&self, pid: u32) -> Result<(), String>;
}

/// Runs `kill -9 <pid>`, preferring `/bin/kill` and falling back to `kill`
/// from `PATH`.
pub struct SystemKill;

impl SystemKill {
    fn program() -> &'static str {
        if Path::new("/bin/kill").exists() {
            "/bin/kill"
        } else {
            "kill"
        }
    }
}

impl KillCommand for SystemKill {
    fn force_kill(&self, pid: u32) -> Result<(), String> {
        to_pid_t(pid).map_err(|e| e.to_string())?;

        let output = Command::new(Self::program())
            .arg("-9")
            .arg(pid.to_string())
            .output()
            .map_err(|e| e.to_string())?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                Err(output.status.to_string())
            } else {
                Err(stderr.to_string())
            }
        }
    }
}
