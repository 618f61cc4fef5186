/*
 * myint.rs - Another handy routine for exercising smallsh
 *
 * usage: myint <n>
 * Sleeps for <n> seconds and sends SIGINT to itself. Run in the foreground
 * it dies by signal 2; run in the background SIGINT is ignored and it
 * exits 0.
 */

use nix::sys::signal::{raise, Signal};
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

    if let Err(err) = raise(Signal::SIGINT) {
        eprintln!("raise (int) error: {}", err);
        process::exit(1);
    }

    process::exit(0);
}
