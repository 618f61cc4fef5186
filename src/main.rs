mod builtins;
mod config;
mod error;
mod exec;
mod jobs;
mod logging;
mod parser;
mod redirect;
mod shell;
mod signals;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use state::ShellState;

fn main() -> Result<()> {
    // Parse command-line arguments.
    let config = Config::parse();
    logging::init_logging(&config)?;

    // Install signal handlers.
    let state = ShellState::new();
    signals::install_signal_handlers(state.foreground_only_flag())
        .context("failed to install signal handlers")?;

    // Run the main shell loop with the options.
    shell::run_shell(&config, state).context("failed to read input")?;
    tracing::debug!("shell exiting");
    Ok(())
}
