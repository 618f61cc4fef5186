//! Standard stream redirection for forked children.
//!
//! A [`RedirectPlan`] is computed from the parsed command and applied in the
//! child after fork and before exec. The parent never opens these files.

use crate::error::RedirectError;
use crate::parser::ParsedCommand;
use nix::fcntl::{open, OFlag};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::os::unix::io::RawFd;

pub const NULL_DEVICE: &str = "/dev/null";

/// Where a redirected stream points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    File(String),
    NullDevice,
}

impl RedirectTarget {
    fn path(&self) -> &str {
        match self {
            RedirectTarget::File(path) => path,
            RedirectTarget::NullDevice => NULL_DEVICE,
        }
    }
}

/// Stream changes for one child. `None` leaves the stream inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectPlan {
    pub stdin: Option<RedirectTarget>,
    pub stdout: Option<RedirectTarget>,
}

impl RedirectPlan {
    /// Explicit files win. Background commands otherwise get the null device
    /// so they never read from or write to the terminal.
    pub fn for_command(cmd: &ParsedCommand) -> Self {
        let pick = |file: &Option<String>| match file {
            Some(path) => Some(RedirectTarget::File(path.clone())),
            None if cmd.background => Some(RedirectTarget::NullDevice),
            None => None,
        };
        RedirectPlan {
            stdin: pick(&cmd.input_file),
            stdout: pick(&cmd.output_file),
        }
    }

    /// Rewires stdin then stdout of the calling process.
    pub fn apply(&self) -> Result<(), RedirectError> {
        if let Some(target) = &self.stdin {
            let fd = open_input(target)?;
            install(fd, STDIN_FILENO)?;
        }
        if let Some(target) = &self.stdout {
            let fd = open_output(target)?;
            install(fd, STDOUT_FILENO)?;
        }
        Ok(())
    }
}

/// Opens a redirection source read-only. The file must exist.
pub fn open_input(target: &RedirectTarget) -> Result<RawFd, RedirectError> {
    let path = target.path();
    open(path, OFlag::O_RDONLY, Mode::empty()).map_err(|source| RedirectError::Input {
        path: path.to_string(),
        source,
    })
}

/// Opens a redirection sink for writing, created with mode 0644 when missing
/// and truncated when present.
pub fn open_output(target: &RedirectTarget) -> Result<RawFd, RedirectError> {
    let path = target.path();
    let flags = match target {
        RedirectTarget::File(_) => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        RedirectTarget::NullDevice => OFlag::O_WRONLY,
    };
    open(path, flags, Mode::from_bits_truncate(0o644)).map_err(|source| {
        RedirectError::Output {
            path: path.to_string(),
            source,
        }
    })
}

/// Moves `fd` into `slot`, replacing whatever was there, and closes the
/// original descriptor.
fn install(fd: RawFd, slot: RawFd) -> Result<(), RedirectError> {
    if fd == slot {
        return Ok(());
    }
    dup2(fd, slot).map_err(|source| RedirectError::Install { slot, source })?;
    close(fd).map_err(|source| RedirectError::Install { slot, source })
}
