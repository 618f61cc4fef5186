use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, warn};

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// Exited normally with the given exit value.
    Exited(i32),
    /// Killed by the given signal number.
    Signaled(i32),
}

impl Default for ChildStatus {
    fn default() -> Self {
        ChildStatus::Exited(0)
    }
}

impl ChildStatus {
    /// Extracts the terminal status from a wait result. Returns `None` for
    /// statuses that do not mean the child is gone.
    pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, Self)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, ChildStatus::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => {
                Some((pid, ChildStatus::Signaled(signal as i32)))
            }
            _ => None,
        }
    }

    pub fn is_signaled(&self) -> bool {
        matches!(self, ChildStatus::Signaled(_))
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildStatus::Exited(code) => write!(f, "exit value {}", code),
            ChildStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

/// Background children that have been launched but not yet reaped, keyed by
/// process ID. Only used for diagnostics; the sweep reaps any finished child.
#[derive(Debug, Default)]
pub struct BackgroundJobs {
    jobs: HashMap<Pid, String>,
}

impl BackgroundJobs {
    /// Creates a new, empty job list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly launched background child.
    pub fn add(&mut self, pid: Pid, cmdline: String) {
        self.jobs.insert(pid, cmdline);
    }

    /// Forgets a reaped child, returning its command line if it was known.
    pub fn remove(&mut self, pid: Pid) -> Option<String> {
        self.jobs.remove(&pid)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Blocks until `pid` terminates and returns how it ended.
pub fn wait_foreground(pid: Pid) -> nix::Result<ChildStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some((_, status)) = ChildStatus::from_wait_status(status) {
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(err) => return Err(err),
        }
    }
}

/// Line printed when the sweep reaps a background child.
pub fn completion_message(pid: Pid, status: ChildStatus) -> String {
    format!("background pid {} is done: {}", pid, status)
}

/// Reaps every child that has finished without blocking, reporting each one.
/// Returns the number of children reaped.
pub fn sweep_background<W: Write>(jobs: &mut BackgroundJobs, out: &mut W) -> io::Result<usize> {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                let Some((pid, status)) = ChildStatus::from_wait_status(status) else {
                    continue;
                };
                let cmdline = jobs.remove(pid);
                debug!(
                    %pid,
                    %status,
                    cmdline = cmdline.as_deref().unwrap_or("?"),
                    "reaped background child"
                );
                writeln!(out, "{}", completion_message(pid, status))?;
                reaped += 1;
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => break,
            Err(err) => {
                warn!(%err, "non-blocking wait failed");
                break;
            }
        }
    }
    out.flush()?;
    Ok(reaped)
}
