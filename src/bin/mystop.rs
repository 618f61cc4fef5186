/*
 * mystop.rs - Another handy routine for exercising smallsh
 *
 * usage: mystop <n>
 * Sleeps for <n> seconds and sends SIGTSTP to its whole process group,
 * which includes the shell that launched it. The shell toggles
 * foreground-only mode; its children ignore the signal.
 */

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::env;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <n>", args[0]);
        process::exit(0);
    }

    let secs = args[1].parse::<u64>().unwrap_or_else(|_| {
        eprintln!("Error: <n> must be a non-negative integer");
        process::exit(1);
    });

    for _ in 0..secs {
        thread::sleep(Duration::from_secs(1));
    }

    // Pid 0 addresses the caller's own process group.
    if let Err(err) = kill(Pid::from_raw(0), Signal::SIGTSTP) {
        eprintln!("kill (tstp) error: {}", err);
        process::exit(1);
    }

    process::exit(0);
}
