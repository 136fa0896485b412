#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// Far above any real pid_max, so nothing can be running under it.
pub const DEAD_PID: u32 = 999_999_999;

/// An isolated home directory with the cron-sync state directory inside it.
pub struct TestEnv {
    home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("create temp home"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home().join(".config").join("cron")
    }

    pub fn record_path(&self) -> PathBuf {
        self.config_dir().join("pid.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.config_dir().join("logs").join("background_service.log")
    }

    pub fn write_record(&self, pid: u32, start_time: &str) {
        std::fs::create_dir_all(self.config_dir()).expect("create config dir");
        let json = format!(
            "{{\n  \"pid\": {},\n  \"start_time\": \"{}\"\n}}",
            pid, start_time
        );
        std::fs::write(self.record_path(), json).expect("write record");
    }

    pub fn read_record(&self) -> Option<String> {
        std::fs::read_to_string(self.record_path()).ok()
    }

    pub fn read_log(&self) -> String {
        std::fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// Applies the isolated environment to any command builder.
    pub fn envs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("HOME", self.home().display().to_string()),
            ("NO_COLOR", "1".to_string()),
            ("CRON_SYNC_PROGRAM", "true".to_string()),
            ("CRON_SYNC_INTERVAL_SECS", "3600".to_string()),
        ]
    }

    pub fn cmd(&self, bin: &str) -> Command {
        let mut cmd = match bin {
            "cron-sync-kill" => Command::new(assert_cmd::cargo::cargo_bin!("cron-sync-kill")),
            _ => Command::new(assert_cmd::cargo::cargo_bin!("cron-sync")),
        };
        for key in REMOVED_VARS {
            cmd.env_remove(key);
        }
        cmd.envs(self.envs());
        cmd
    }
}

const REMOVED_VARS: [&str; 6] = [
    "CRON_SYNC_HOME",
    "CRON_SYNC_CONFIG_DIR",
    "CRON_SYNC_SOURCE",
    "CRON_SYNC_REMOTE",
    "CRON_SYNC_LOG",
    "RUST_LOG",
];

pub fn removed_vars() -> &'static [&'static str] {
    &REMOVED_VARS
}

/// Polls `condition` every 50ms until it holds or `timeout` passes.
pub fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    condition()
}

pub fn is_alive(pid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

pub fn send_sigterm(pid: u32) {
    send_signal(pid, libc::SIGTERM);
}

pub fn send_sigint(pid: u32) {
    send_signal(pid, libc::SIGINT);
}

fn send_signal(pid: u32, signal: libc::c_int) {
    // SAFETY: kill has no memory-safety preconditions.
    unsafe {
        libc::kill(pid as libc::pid_t, signal);
    }
}
