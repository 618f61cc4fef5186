use nix::errno::Errno;
use std::ffi::NulError;
use std::io;
use thiserror::Error;

/// Errors produced while turning an input line into a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("input line is too long ({len} bytes, at most {max} allowed)")]
    LineTooLong { len: usize, max: usize },
    #[error("syntax error: missing file name after `{operator}`")]
    MissingRedirectTarget { operator: char },
    #[error("too many arguments (at most {max} allowed)")]
    TooManyArguments { max: usize },
    #[error("syntax error: no command given")]
    MissingCommand,
    #[error("syntax error: argument contains a NUL byte")]
    NulByte,
}

/// Failures of the parent side of a launch. The command is dropped and the
/// shell returns to the prompt.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("fork: {}", .0.desc())]
    Fork(#[source] Errno),
    #[error("waitpid: {}", .0.desc())]
    Wait(#[source] Errno),
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] NulError),
}

/// A redirection that could not be set up inside a child. Fatal to the child.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("cannot open {path} for input")]
    Input {
        path: String,
        #[source]
        source: Errno,
    },
    #[error("cannot open {path} for output")]
    Output {
        path: String,
        #[source]
        source: Errno,
    },
    #[error("cannot redirect descriptor {slot}: {}", .source.desc())]
    Install {
        slot: i32,
        #[source]
        source: Errno,
    },
}

/// The program image could not be replaced. Fatal to the child.
#[derive(Debug, Error)]
#[error("{program}: no such file or directory")]
pub struct ExecError {
    pub program: String,
    #[source]
    pub source: Errno,
}

/// Everything the main loop can recover from.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("cd: {path}: {}", .source.desc())]
    ChangeDir {
        path: String,
        #[source]
        source: Errno,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
