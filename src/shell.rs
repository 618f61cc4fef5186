use crate::builtins::{handle_builtin, BuiltinOutcome};
use crate::config::Config;
use crate::error::{ParseError, ShellError};
use crate::exec::execute_command;
use crate::jobs::{sweep_background, BackgroundJobs};
use crate::parser::{parse_command_line, MAX_INPUT_LENGTH};
use crate::state::ShellState;
use nix::libc::STDIN_FILENO;
use nix::unistd::isatty;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of asking the line source for input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The line exceeded the input limit and was discarded; `len` excludes
    /// the terminator.
    TooLong { len: usize },
    /// Ctrl-C at the prompt; the partial line is discarded.
    Interrupted,
    Eof,
}

/// Where command lines come from: a line editor on a terminal, buffered
/// standard input otherwise.
pub enum LineSource {
    Editor {
        editor: DefaultEditor,
        history: Option<PathBuf>,
    },
    Stdin {
        emit_prompt: bool,
    },
}

impl LineSource {
    pub fn new(config: &Config) -> Self {
        let interactive = config.emit_prompt() && isatty(STDIN_FILENO).unwrap_or(false);
        if !interactive {
            return LineSource::Stdin {
                emit_prompt: config.emit_prompt(),
            };
        }

        match DefaultEditor::new() {
            Ok(mut editor) => {
                let history = config.history_path();
                if let Some(path) = &history {
                    if let Err(err) = editor.load_history(path) {
                        debug!(path = %path.display(), %err, "no history loaded");
                    }
                }
                LineSource::Editor { editor, history }
            }
            Err(err) => {
                warn!(%err, "line editor unavailable, reading plain standard input");
                LineSource::Stdin { emit_prompt: true }
            }
        }
    }

    pub fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        match self {
            LineSource::Editor { editor, .. } => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    Ok(ReadOutcome::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
                Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
                Err(ReadlineError::Io(err)) => Err(err),
                Err(err) => Err(io::Error::other(err)),
            },
            LineSource::Stdin { emit_prompt } => {
                if *emit_prompt {
                    let mut stdout = io::stdout();
                    write!(stdout, "{}", prompt)?;
                    stdout.flush()?;
                }
                read_bounded_line(&mut io::stdin().lock(), MAX_INPUT_LENGTH)
            }
        }
    }

    /// Persists history, if any.
    pub fn close(self) {
        if let LineSource::Editor {
            mut editor,
            history: Some(path),
        } = self
        {
            if let Err(err) = editor.save_history(&path) {
                warn!(path = %path.display(), %err, "failed to save history");
            }
        }
    }
}

/// Reads one line of at most `limit` bytes plus terminator. Longer lines are
/// consumed up to their newline and reported as `TooLong`. Bytes that are
/// not UTF-8 are replaced rather than rejected.
pub fn read_bounded_line<R: BufRead>(reader: &mut R, limit: usize) -> io::Result<ReadOutcome> {
    let mut buf = Vec::new();
    let bound = limit + 2;
    let read = reader.by_ref().take(bound as u64).read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(ReadOutcome::Eof);
    }
    if buf.ends_with(b"\n") || read < bound {
        return Ok(ReadOutcome::Line(String::from_utf8_lossy(&buf).into_owned()));
    }

    let mut len = buf.len();
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if available.is_empty() {
            break;
        }
        match available.iter().position(|&byte| byte == b'\n') {
            Some(end) => {
                len += end;
                reader.consume(end + 1);
                break;
            }
            None => {
                let consumed = available.len();
                len += consumed;
                reader.consume(consumed);
            }
        }
    }
    Ok(ReadOutcome::TooLong { len })
}

/// Runs the main shell loop until `exit` or end of input.
///
/// Each iteration reaps finished background children, reads and parses one
/// line, then dispatches it to a built-in or launches it.
pub fn run_shell(config: &Config, mut state: ShellState) -> io::Result<()> {
    let mut source = LineSource::new(config);
    let mut jobs = BackgroundJobs::new();
    let mut out = io::stdout();

    loop {
        if let Err(err) = sweep_background(&mut jobs, &mut out) {
            warn!(%err, "failed to report finished background children");
        }
        if let Some(enabled) = state.take_mode_change() {
            info!(enabled, "foreground-only mode changed");
        }

        let line = match source.read_line(&config.prompt) {
            Ok(ReadOutcome::Line(line)) => line,
            Ok(ReadOutcome::TooLong { len }) => {
                let err = ParseError::LineTooLong {
                    len,
                    max: MAX_INPUT_LENGTH,
                };
                report(&mut out, &err.into());
                continue;
            }
            Ok(ReadOutcome::Interrupted) => continue,
            Ok(ReadOutcome::Eof) => {
                debug!("end of input");
                break;
            }
            // Undecodable input is one bad line, not a dead terminal.
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                report(&mut out, &err.into());
                continue;
            }
            Err(err) => return Err(err),
        };

        let command = match parse_command_line(&line, state.foreground_only()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                report(&mut out, &err.into());
                continue;
            }
        };
        debug!(cmdline = %command.cmdline(), background = command.background, "parsed command");

        match handle_builtin(&command, &state, &mut out) {
            Ok(BuiltinOutcome::NotBuiltin) => {}
            Ok(BuiltinOutcome::Handled) => continue,
            Ok(BuiltinOutcome::Exit) => break,
            Err(err) => {
                report(&mut out, &err);
                continue;
            }
        }

        if let Err(err) = execute_command(command, &mut state, &mut jobs, &mut out) {
            report(&mut out, &err);
        }
    }

    if !jobs.is_empty() {
        warn!(running = jobs.len(), "exiting with background children still running");
    }
    source.close();
    Ok(())
}

fn report<W: Write>(out: &mut W, err: &ShellError) {
    debug!(%err, "command failed");
    let _ = writeln!(out, "{}", err);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn reads_lines_until_eof() {
        let mut input = Cursor::new(b"ls -la\nstatus".to_vec());
        assert_eq!(
            read_bounded_line(&mut input, 16).unwrap(),
            ReadOutcome::Line("ls -la\n".into())
        );
        assert_eq!(
            read_bounded_line(&mut input, 16).unwrap(),
            ReadOutcome::Line("status".into())
        );
        assert_eq!(read_bounded_line(&mut input, 16).unwrap(), ReadOutcome::Eof);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut input = Cursor::new(b"echo \xff\n".to_vec());
        assert_eq!(
            read_bounded_line(&mut input, 16).unwrap(),
            ReadOutcome::Line("echo \u{FFFD}\n".into())
        );
    }

    #[test]
    fn line_at_the_limit_is_kept() {
        let mut input = Cursor::new(b"12345678\r\nnext\n".to_vec());
        assert_eq!(
            read_bounded_line(&mut input, 8).unwrap(),
            ReadOutcome::Line("12345678\r\n".into())
        );
    }

    #[test]
    fn overlong_line_is_drained_to_its_newline() {
        let mut bytes = vec![b'x'; 100];
        bytes.extend_from_slice(b"\nstatus\n");
        let mut input = Cursor::new(bytes);
        assert_eq!(
            read_bounded_line(&mut input, 8).unwrap(),
            ReadOutcome::TooLong { len: 100 }
        );
        assert_eq!(
            read_bounded_line(&mut input, 8).unwrap(),
            ReadOutcome::Line("status\n".into())
        );
    }

    #[test]
    fn overlong_final_line_without_newline() {
        let mut input = Cursor::new(vec![b'y'; 40]);
        assert_eq!(
            read_bounded_line(&mut input, 8).unwrap(),
            ReadOutcome::TooLong { len: 40 }
        );
        let mut rest = Vec::new();
        input.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }
}
