// src/bin/atexpand.rs

use atexpand::{
    cli::{Cli, dispatcher},
    core::dispatcher::ExpandError,
};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// The main entry point of the `atexpand` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    let cancellation_token = Arc::new(AtomicBool::new(false));
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("CLI args parsed: {:?}", cli);

    if let Err(e) = dispatcher::dispatch(cli.args, &cancellation_token) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);

        // Malformed input in strict mode gets its own exit code.
        if e.downcast_ref::<ExpandError>().is_some() {
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}
