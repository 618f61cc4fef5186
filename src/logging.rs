//! Diagnostic logging.
//!
//! Standard output carries the shell's user-visible messages, so diagnostics
//! go to standard error or to `--log-file`. The level comes from `RUST_LOG`,
//! falling back to `debug` with `-v` and `warn` otherwise.
//!
//! Writers are synchronous: the shell forks, and it stays single-threaded.

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_line_number(true)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    tracing::debug!(log_file = ?config.log_file, "logging initialized");
    Ok(())
}
