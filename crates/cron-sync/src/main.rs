use std::io::Write;

use clap::Parser;

use cron_sync::cli::{Cli, Mode};
use cron_sync::launcher::{describe_interval, launch};
use cron_sync::{LaunchError, UnixProcessController};
use cron_sync_common::{Colors, SyncConfig, color_init};
use cron_sync_daemon::{
    EventLog, init_diagnostics_tracing, init_foreground_tracing, init_worker_tracing,
    run_foreground, run_worker,
};

fn main() {
    let cli = Cli::parse();
    color_init(cli.no_color);

    if let Err(e) = run(cli.mode()) {
        eprintln!("{} {}", Colors::error("Error:"), e);
        eprintln!("{} {}", Colors::dim("Suggestion:"), e.suggestion());
        std::process::exit(1);
    }
}

fn run(mode: Mode) -> Result<(), LaunchError> {
    let config = SyncConfig::from_env()?;

    match mode {
        Mode::Worker => {
            let _guard = init_worker_tracing(EventLog::new(&config.log_path));
            run_worker(&config);
        }
        Mode::Foreground => {
            let mut stdout = std::io::stdout();
            writeln!(
                stdout,
                "Starting scheduled sync, will run every {}",
                describe_interval(config.interval)
            )?;
            writeln!(stdout, "Press Ctrl+C to stop the program")?;
            stdout.flush()?;

            let _guard = init_foreground_tracing();
            run_foreground(&config);
        }
        Mode::Launch => {
            let _guard = init_diagnostics_tracing("warn");
            launch(&config, &UnixProcessController, &mut std::io::stdout())?;
        }
    }

    Ok(())
}
