/*
 * myspin.rs - A handy program for exercising smallsh
 *
 * usage: myspin <n> [status]
 * Sleeps for <n> seconds in 1-second chunks, then exits with [status]
 * (default 0).
 */

use std::env;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <n> [status]", args[0]);
        process::exit(0);
    }

    let secs = args[1].parse::<u64>().unwrap_or_else(|_| {
        eprintln!("Error: <n> must be a non-negative integer");
        process::exit(1);
    });
    let status = match args.get(2) {
        Some(arg) => arg.parse::<i32>().unwrap_or_else(|_| {
            eprintln!("Error: [status] must be an integer");
            process::exit(1);
        }),
        None => 0,
    };

    for _ in 0..secs {
        thread::sleep(Duration::from_secs(1));
    }

    process::exit(status);
}
