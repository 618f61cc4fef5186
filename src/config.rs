use clap::Parser;
use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Global prompt string.
pub const DEFAULT_PROMPT: &str = ": ";

const HISTORY_FILE_NAME: &str = ".smallsh_history";

static DEFAULT_HISTORY_PATH: Lazy<Option<PathBuf>> =
    Lazy::new(|| dirs_next::home_dir().map(|home| home.join(HISTORY_FILE_NAME)));

/// Command-line options.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "smallsh",
    version,
    about = "A small shell with I/O redirection, background jobs and a foreground-only mode"
)]
pub struct Config {
    /// Do not print a command prompt
    #[arg(short = 'p', long)]
    pub no_prompt: bool,

    /// Emit debug diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Prompt printed before each command
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Append diagnostics to this file instead of standard error
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Line-editor history file (defaults to ~/.smallsh_history)
    #[arg(long, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Do not load or save line-editor history
    #[arg(long)]
    pub no_history: bool,
}

impl Config {
    pub fn emit_prompt(&self) -> bool {
        !self.no_prompt
    }

    /// History file to use, if history is enabled and a location is known.
    pub fn history_path(&self) -> Option<PathBuf> {
        if self.no_history {
            return None;
        }
        self.history_file
            .clone()
            .or_else(|| DEFAULT_HISTORY_PATH.clone())
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["smallsh"]).unwrap();
        assert!(config.emit_prompt());
        assert_eq!(config.prompt, ": ");
        assert_eq!(config.default_log_filter(), "warn");
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn scripted_flags() {
        let config = Config::try_parse_from([
            "smallsh",
            "-p",
            "-v",
            "--prompt",
            "$ ",
            "--log-file",
            "/tmp/smallsh.log",
            "--history-file",
            "/tmp/hist",
        ])
        .unwrap();
        assert!(!config.emit_prompt());
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.default_log_filter(), "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/smallsh.log")));
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/hist")));
    }

    #[test]
    fn history_can_be_disabled() {
        let config =
            Config::try_parse_from(["smallsh", "--no-history", "--history-file", "/tmp/hist"])
                .unwrap();
        assert_eq!(config.history_path(), None);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Config::try_parse_from(["smallsh", "--bogus"]).is_err());
    }
}
