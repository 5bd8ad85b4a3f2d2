// src/log.rs
//! Subscriber setup for the binary. The library only emits `tracing` events.

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::Uptime;

use crate::config::consts::{DEFAULT_LOG_FILTER, LOG_ENV, LOG_FILE, STORE_DIR};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to `.store/debug.log`.
    File,
}

/// Install the global subscriber. Filter comes from `VENUE_SCRAPE_LOG`,
/// falling back to `info`. Timestamps are elapsed time since start.
pub fn init(target: LogTarget) -> io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(Uptime::default())
        .with_target(false);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File => {
            fs::create_dir_all(STORE_DIR)?;
            let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };
    installed.map_err(io::Error::other)
}
