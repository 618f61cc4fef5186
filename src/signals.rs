use nix::libc::STDOUT_FILENO;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;
use signal_hook::consts::signal::SIGTSTP;
use signal_hook::SigId;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const ENTER_FOREGROUND_ONLY: &str = "\nEntering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY: &str = "\nExiting foreground-only mode\n";

/// What a process does on receipt of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Default,
    Ignore,
}

impl Disposition {
    fn handler(self) -> SigHandler {
        match self {
            Disposition::Default => SigHandler::SigDfl,
            Disposition::Ignore => SigHandler::SigIgn,
        }
    }
}

/// Signal dispositions a freshly forked child sets before exec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSignalPolicy {
    pub interrupt: Disposition,
    pub stop: Disposition,
    pub pipe: Disposition,
}

impl ChildSignalPolicy {
    /// Background children ignore SIGINT, foreground children can be
    /// interrupted. No child can be stopped with SIGTSTP. SIGPIPE goes back
    /// to the default the Rust runtime replaced in the shell.
    pub fn for_child(background: bool) -> Self {
        ChildSignalPolicy {
            interrupt: if background {
                Disposition::Ignore
            } else {
                Disposition::Default
            },
            stop: Disposition::Ignore,
            pipe: Disposition::Default,
        }
    }

    /// Installs the policy in the calling process. Only meant to run in a
    /// forked child.
    pub fn apply(self) -> nix::Result<()> {
        set_disposition(Signal::SIGINT, self.interrupt)?;
        set_disposition(Signal::SIGTSTP, self.stop)?;
        set_disposition(Signal::SIGPIPE, self.pipe)
    }
}

fn set_disposition(signal: Signal, disposition: Disposition) -> nix::Result<()> {
    let action = SigAction::new(disposition.handler(), SaFlags::empty(), SigSet::all());
    unsafe { sigaction(signal, &action) }.map(drop)
}

/// Flips foreground-only mode and returns the notice announcing the new mode.
pub fn toggle_foreground_only(flag: &AtomicBool) -> &'static str {
    if flag.fetch_xor(true, Ordering::SeqCst) {
        EXIT_FOREGROUND_ONLY
    } else {
        ENTER_FOREGROUND_ONLY
    }
}

/// Installs the shell's own dispositions:
/// - SIGINT: ignored, so Ctrl-C never kills the shell.
/// - SIGTSTP: toggles foreground-only mode and writes a notice to stdout.
///
/// The SIGTSTP handler runs in signal context. It only touches the atomic
/// flag and issues a raw write(2) of a static string.
pub fn install_signal_handlers(foreground_only: Arc<AtomicBool>) -> io::Result<SigId> {
    set_disposition(Signal::SIGINT, Disposition::Ignore)
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;

    unsafe {
        signal_hook::low_level::register(SIGTSTP, move || {
            let notice = toggle_foreground_only(&foreground_only);
            let _ = unistd::write(STDOUT_FILENO, notice.as_bytes());
        })
    }
}
