use crate::error::ParseError;
use std::ffi::{CString, NulError};

/// Longest accepted input line, not counting the line terminator.
pub const MAX_INPUT_LENGTH: usize = 2048;
/// Most arguments a single command may carry.
pub const MAX_ARGS: usize = 512;

/// Represents a parsed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command and its arguments. Never empty once parsed.
    pub argv: Vec<String>,
    /// Input redirection file, if any.
    pub input_file: Option<String>,
    /// Output redirection file, if any.
    pub output_file: Option<String>,
    /// Run without waiting for the child.
    pub background: bool,
}

impl ParsedCommand {
    /// Name of the program to run.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments converted for the exec family, program name first.
    pub fn exec_args(&self) -> Result<Vec<CString>, NulError> {
        self.argv.iter().map(|arg| CString::new(arg.as_bytes())).collect()
    }

    /// Rebuilds a normalized command line, used in diagnostics.
    pub fn cmdline(&self) -> String {
        let mut line = self.argv.join(" ");
        if let Some(input) = &self.input_file {
            line.push_str(" < ");
            line.push_str(input);
        }
        if let Some(output) = &self.output_file {
            line.push_str(" > ");
            line.push_str(output);
        }
        if self.background {
            line.push_str(" &");
        }
        line
    }
}

/// Parses one input line.
///
/// Returns `Ok(None)` for blank lines and for lines starting with `#`.
/// Tokens are whitespace-delimited, with no quoting:
///
/// - `<` and `>` take the following token as the input or output file
/// - `&` marks the command as background unless `foreground_only` is set,
///   in which case it is dropped; it is honored wherever it appears
/// - every other token is an argument
pub fn parse_command_line(
    line: &str,
    foreground_only: bool,
) -> Result<Option<ParsedCommand>, ParseError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.len() > MAX_INPUT_LENGTH {
        return Err(ParseError::LineTooLong {
            len: line.len(),
            max: MAX_INPUT_LENGTH,
        });
    }
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(None);
    }
    if line.contains('\0') {
        return Err(ParseError::NulByte);
    }

    let mut cmd = ParsedCommand::default();
    let mut tokens = line.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "<" => {
                let file = tokens
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget { operator: '<' })?;
                cmd.input_file = Some(file.to_string());
            }
            ">" => {
                let file = tokens
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget { operator: '>' })?;
                cmd.output_file = Some(file.to_string());
            }
            "&" => {
                if !foreground_only {
                    cmd.background = true;
                }
            }
            _ => {
                if cmd.argv.len() == MAX_ARGS {
                    return Err(ParseError::TooManyArguments { max: MAX_ARGS });
                }
                cmd.argv.push(token.to_string());
            }
        }
    }

    if cmd.argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    Ok(Some(cmd))
}
