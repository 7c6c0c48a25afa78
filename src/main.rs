//! slsynth - SyncLink frequency synthesizer programmer
//!
//! Programs the ICS307 synthesizer on SyncLink PCI Express cards and USB
//! adapters, switches the serial controller's base clock to it and then
//! exercises the link with a raw bit stream.
//!
//! # Architecture
//!
//! - `slsynth-core` holds the word tables and the bit-serial programming
//!   sequence, written against the `GpioPort` and `BaseClock` traits
//! - `slsynth-linux` implements those traits for SyncLink tty devices and
//!   provides the raw mode port setup and data transfer calls
//! - `slsynth-dummy` emulates an adapter in memory for dry runs and tests

mod cancel;
mod cli;
mod commands;
mod hexdump;
mod link;

use clap::Parser;
use cli::Cli;
use commands::program::Session;
use commands::raw::Pacing;

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(&cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list {
        commands::list_frequencies();
        return Ok(());
    }

    let session = if cli.program_only {
        Session::ProgramOnly
    } else if cli.burst {
        Session::Raw(Pacing::Burst)
    } else {
        Session::Raw(Pacing::Continuous)
    };

    if cli.dummy {
        return run_dummy(cli, session);
    }

    commands::program::run_device(&cli.device, &cli.peers, cli.frequency, session)
}

#[cfg(feature = "dummy")]
fn run_dummy(cli: &Cli, session: Session) -> Result<(), Box<dyn std::error::Error>> {
    commands::program::run_dummy(&cli.peers, cli.frequency, session)
}

#[cfg(not(feature = "dummy"))]
fn run_dummy(_cli: &Cli, _session: Session) -> Result<(), Box<dyn std::error::Error>> {
    Err("slsynth was built without the dummy feature".into())
}
