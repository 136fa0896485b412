use clap::Parser;

use cron_sync::cli::KillCli;
use cron_sync::{ControlError, Controller, Prompt, RealSleeper, SystemKill, UnixProcessController};
use cron_sync_common::{Colors, ProcessRegistry, SyncConfig, SystemClock, color_init};
use cron_sync_daemon::init_diagnostics_tracing;

fn main() {
    let cli = KillCli::parse();
    color_init(cli.no_color);
    let _guard = init_diagnostics_tracing("warn");

    if let Err(e) = run() {
        println!("{} {}", Colors::error("Error:"), e);
        println!("{} {}", Colors::dim("Suggestion:"), e.suggestion());
        std::process::exit(1);
    }
}

fn run() -> Result<(), ControlError> {
    let config = SyncConfig::from_env()?;
    let registry = ProcessRegistry::new(&config.record_path);

    let controller = Controller::new(
        &registry,
        &UnixProcessController,
        &SystemKill,
        &RealSleeper,
        &SystemClock,
    );

    let stdin = std::io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), std::io::stdout());
    let outcome = controller.run(&mut prompt)?;
    tracing::debug!(?outcome, "controller finished");
    Ok(())
}
