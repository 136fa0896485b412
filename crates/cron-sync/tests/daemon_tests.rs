mod common;

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use common::{TestEnv, is_alive, removed_vars, send_sigint, send_sigterm, wait_until};
use predicates::prelude::*;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(15);

fn worker_command(env: &TestEnv) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cron-sync"));
    cmd.arg("--daemon")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    for key in removed_vars() {
        cmd.env_remove(key);
    }
    cmd.envs(env.envs());
    cmd
}

fn is_log_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() > 22
        && bytes[0] == b'['
        && bytes[5] == b'-'
        && bytes[11] == b' '
        && bytes[14] == b':'
        && bytes[20] == b']'
        && bytes[21] == b' '
}

#[test]
fn test_worker_records_syncs_and_cleans_up_on_sigterm() {
    let env = TestEnv::new();
    let mut child = worker_command(&env).spawn().expect("spawn worker");
    let pid = child.id();

    assert!(
        wait_until(STARTUP_TIMEOUT, || env
            .read_log()
            .contains("Next sync scheduled for:")),
        "worker never completed its first cycle"
    );

    let record = env.read_record().expect("record written");
    let value: serde_json::Value = serde_json::from_str(&record).expect("record is JSON");
    assert_eq!(value["pid"], pid);
    assert!(value["start_time"].is_string());

    send_sigterm(pid);
    let exited = wait_until(STARTUP_TIMEOUT, || matches!(child.try_wait(), Ok(Some(_))));
    if !exited {
        let _ = child.kill();
        panic!("worker did not exit after SIGTERM");
    }

    assert!(env.read_record().is_none());

    let log = env.read_log();
    assert!(log.contains("PID information saved to"));
    assert!(log.contains("Background service started"));
    assert!(log.contains("Starting true sync"));
    assert!(log.contains("Sync completed successfully"));
    assert!(log.contains("Termination signal received"));
    assert!(log.contains("Background service shutting down"));
    assert!(log.contains("PID file removed"));
    assert!(log.lines().all(is_log_line), "malformed log:\n{}", log);
}

#[test]
fn test_worker_logs_failing_sync_and_keeps_running() {
    let env = TestEnv::new();
    let mut cmd = worker_command(&env);
    cmd.env("CRON_SYNC_PROGRAM", "false");
    let mut child = cmd.spawn().expect("spawn worker");

    assert!(wait_until(STARTUP_TIMEOUT, || env
        .read_log()
        .contains("Next sync scheduled for:")));
    assert!(matches!(child.try_wait(), Ok(None)));

    send_sigterm(child.id());
    assert!(wait_until(STARTUP_TIMEOUT, || matches!(
        child.try_wait(),
        Ok(Some(_))
    )));

    let log = env.read_log();
    assert!(log.contains("Error executing sync command: exit status 1"));
    assert!(env.read_record().is_none());
}

#[test]
fn test_worker_log_ignores_inherited_rust_log() {
    let env = TestEnv::new();
    let mut cmd = worker_command(&env);
    cmd.env("RUST_LOG", "warn");
    let mut child = cmd.spawn().expect("spawn worker");

    assert!(
        wait_until(STARTUP_TIMEOUT, || env
            .read_log()
            .contains("Next sync scheduled for:")),
        "worker log stayed empty under RUST_LOG=warn"
    );

    send_sigterm(child.id());
    assert!(wait_until(STARTUP_TIMEOUT, || matches!(
        child.try_wait(),
        Ok(Some(_))
    )));

    let log = env.read_log();
    assert!(log.contains("Background service started"));
    assert!(log.contains("Sync completed successfully"));
    assert!(log.contains("Background service shutting down"));
    assert!(log.contains("PID file removed"));
}

/// Collects a child's stdout on a background thread so it can be polled
/// while the child runs.
fn capture_stdout(child: &mut Child) -> (Arc<Mutex<String>>, JoinHandle<()>) {
    let mut stdout = child.stdout.take().expect("piped stdout");
    let captured = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&captured);
    let handle = thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match stdout.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => sink
                    .lock()
                    .unwrap()
                    .push_str(&String::from_utf8_lossy(&buf[..n])),
            }
        }
    });
    (captured, handle)
}

#[test]
fn test_foreground_streams_progress_and_stops_on_sigint() {
    let env = TestEnv::new();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cron-sync"));
    cmd.arg("--foreground")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    for key in removed_vars() {
        cmd.env_remove(key);
    }
    cmd.envs(env.envs()).env("CRON_SYNC_PROGRAM", "echo");
    let mut child = cmd.spawn().expect("spawn foreground run");
    let (captured, reader) = capture_stdout(&mut child);

    let cycled = wait_until(STARTUP_TIMEOUT, || {
        captured
            .lock()
            .unwrap()
            .contains("Next sync scheduled for:")
    });
    if !cycled {
        let _ = child.kill();
        panic!("foreground run never finished a cycle");
    }

    send_sigint(child.id());
    let exited = wait_until(STARTUP_TIMEOUT, || matches!(child.try_wait(), Ok(Some(_))));
    if !exited {
        let _ = child.kill();
        panic!("foreground run ignored SIGINT");
    }
    reader.join().unwrap();

    let stdout = captured.lock().unwrap().clone();
    assert!(stdout.contains("Starting scheduled sync, will run every 60 minutes"));
    assert!(stdout.contains("Press Ctrl+C to stop the program"));
    // echo prints its arguments straight to the inherited stdout.
    let echoed = format!("sync {} gdrive:Data -P", env.home().join("db").display());
    assert!(
        stdout.lines().any(|line| line == echoed),
        "missing progress run in:\n{}",
        stdout
    );
    assert!(stdout.contains("Background service shutting down"));
    assert!(env.read_record().is_none());
    assert!(!env.config_dir().exists());
}

#[test]
fn test_launcher_detaches_worker() {
    let env = TestEnv::new();

    let output = env
        .cmd("cron-sync")
        .timeout(STARTUP_TIMEOUT)
        .output()
        .expect("run launcher");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Starting scheduled sync, will run every 60 minutes"));
    assert!(stdout.contains("--- Program is continuing in background services ---"));

    let pid: u32 = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Process ID: "))
        .and_then(|pid| pid.trim().parse().ok())
        .expect("launcher printed the worker pid");

    assert!(
        wait_until(STARTUP_TIMEOUT, || env.read_record().is_some()),
        "worker never wrote its record"
    );
    assert!(is_alive(pid));

    send_sigterm(pid);
    assert!(wait_until(STARTUP_TIMEOUT, || env.read_record().is_none()));
    assert!(wait_until(STARTUP_TIMEOUT, || env
        .read_log()
        .contains("Background service shutting down")));
}

#[test]
fn test_launcher_refuses_second_instance() {
    let env = TestEnv::new();
    env.write_record(std::process::id(), "2025-06-01T10:00:00+00:00");

    env.cmd("cron-sync")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "A background service is already running (PID {})",
            std::process::id()
        )))
        .stderr(predicate::str::contains("cron-sync-kill"));

    assert!(env.read_record().is_some());
}

#[test]
fn test_launcher_without_home_fails() {
    let env = TestEnv::new();

    env.cmd("cron-sync")
        .env_remove("HOME")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_daemon_and_foreground_are_exclusive() {
    let env = TestEnv::new();

    env.cmd("cron-sync")
        .args(["--daemon", "--foreground"])
        .assert()
        .failure();
}
