use clap::Parser;
use warlot_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // -v logs every request to stderr; otherwise log to the state dir.
    if cli.global.verbose {
        logging::init_logging_stderr(true);
    } else if logging::init_logging().is_err() {
        logging::init_logging_stderr(false);
    }

    if let Err(err) = cli.run() {
        eprintln!("warlotdev error: {:#}", err);
        std::process::exit(1);
    }
}
