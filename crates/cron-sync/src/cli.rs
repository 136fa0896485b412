use clap::Parser;

const LONG_ABOUT: &str = r#"Mirror a local directory to an rclone remote on a fixed interval.

Without flags, cron-sync starts a detached background worker and returns
immediately. The worker syncs once right away, then again every interval,
and records its PID so that 'cron-sync-kill' can find and stop it.

FILES:
    ~/.config/cron/pid.json                      PID of the running worker
    ~/.config/cron/logs/background_service.log   worker event log

ENVIRONMENT:
    CRON_SYNC_HOME            home directory (default: $HOME)
    CRON_SYNC_CONFIG_DIR      state directory (default: ~/.config/cron)
    CRON_SYNC_INTERVAL_SECS   seconds between syncs (default: 3600)
    CRON_SYNC_PROGRAM         sync executable (default: rclone)
    CRON_SYNC_SOURCE          directory to mirror (default: ~/db)
    CRON_SYNC_REMOTE          destination (default: gdrive:Data)
    CRON_SYNC_LOG             write diagnostics to this file instead of stderr

EXAMPLES:
    cron-sync                 # start the background worker
    cron-sync --foreground    # run attached, with rclone progress
    cron-sync-kill            # stop the background worker"#;

#[derive(Parser, Debug)]
#[command(name = "cron-sync")]
#[command(author, version)]
#[command(about = "Hourly background rclone mirroring")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    /// Run as the background worker (used internally by the launcher)
    #[arg(long, hide = true, conflicts_with = "foreground")]
    pub daemon: bool,

    /// Run the schedule attached to this terminal until Ctrl+C
    #[arg(long)]
    pub foreground: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Launch,
    Worker,
    Foreground,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.daemon {
            Mode::Worker
        } else if self.foreground {
            Mode::Foreground
        } else {
            Mode::Launch
        }
    }
}

/// Interactively stop the background worker started by cron-sync.
#[derive(Parser, Debug)]
#[command(name = "cron-sync-kill")]
#[command(author, version)]
pub struct KillCli {
    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
