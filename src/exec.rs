use crate::error::{ExecError, LaunchError, ShellError};
use crate::jobs::{wait_foreground, BackgroundJobs};
use crate::parser::ParsedCommand;
use crate::redirect::RedirectPlan;
use crate::signals::ChildSignalPolicy;
use crate::state::ShellState;
use nix::unistd::{execvp, fork, ForkResult};
use std::ffi::CString;
use std::fmt::Display;
use std::io::{self, Write};
use std::process;
use tracing::{debug, info};

/// Executes an external command.
///
/// The child sets its signal policy, applies redirections and replaces itself
/// with the program; any failure there ends the child with status 1. The
/// parent either waits for the child (foreground) or reports its pid and
/// returns at once (background).
pub fn execute_command<W: Write>(
    cmd: ParsedCommand,
    state: &mut ShellState,
    jobs: &mut BackgroundJobs,
    out: &mut W,
) -> Result<(), ShellError> {
    let args = cmd.exec_args().map_err(LaunchError::from)?;
    if args.is_empty() {
        return Ok(());
    }

    // Anything still buffered would otherwise be written by both processes.
    out.flush()?;
    io::stdout().flush()?;

    match unsafe { fork() } {
        Ok(ForkResult::Child) => run_child(&cmd, &args),
        Ok(ForkResult::Parent { child }) => {
            if cmd.background {
                info!(pid = %child, cmdline = %cmd.cmdline(), "launched background child");
                jobs.add(child, cmd.cmdline());
                writeln!(out, "background pid is {}", child)?;
                out.flush()?;
                return Ok(());
            }

            debug!(pid = %child, cmdline = %cmd.cmdline(), "waiting for foreground child");
            let status = wait_foreground(child).map_err(LaunchError::Wait)?;
            debug!(pid = %child, %status, "foreground child finished");
            state.record_foreground(status);
            if status.is_signaled() {
                writeln!(out, "{}", status)?;
                out.flush()?;
            }
            Ok(())
        }
        Err(errno) => Err(LaunchError::Fork(errno).into()),
    }
}

/// Child side of the fork. Never returns into shell logic.
fn run_child(cmd: &ParsedCommand, args: &[CString]) -> ! {
    if let Err(errno) = ChildSignalPolicy::for_child(cmd.background).apply() {
        child_exit(format_args!("sigaction: {}", errno.desc()));
    }
    if let Err(err) = RedirectPlan::for_command(cmd).apply() {
        child_exit(err);
    }
    let err = match execvp(&args[0], args) {
        Ok(never) => match never {},
        Err(source) => ExecError {
            program: cmd.program().unwrap_or_default().to_string(),
            source,
        },
    };
    child_exit(err)
}

fn child_exit(message: impl Display) -> ! {
    let mut stdout = io::stdout();
    let _ = writeln!(stdout, "{}", message);
    let _ = stdout.flush();
    process::exit(1)
}
