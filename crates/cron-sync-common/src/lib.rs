//! Shared pieces of the cron-sync workspace.
//!
//! Provides the startup configuration, a wall clock abstraction, the process
//! registry that records the running background worker, and terminal color
//! handling.

#![deny(clippy::all)]

mod clock;
mod color;
mod config;
mod record;

pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use color::Colors;
pub use color::init as color_init;
pub use config::ConfigError;
pub use config::SyncCommand;
pub use config::SyncConfig;
pub use config::DEFAULT_INTERVAL;
pub use record::ProcessRecord;
pub use record::ProcessRegistry;
pub use record::RegistryError;
