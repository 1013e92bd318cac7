//! `mycli-install`: install the `mycli` binary and put it on `PATH`.
use std::process::ExitCode;

use clap::Parser;

use mycli::cli::Cli;
use mycli::commands;
use mycli::error::InstallError;
use mycli::logging::{Logger, init_subscriber};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let log = Logger::new("install");
    init_subscriber(args.verbose, &log);

    match commands::install::run(&args, &log) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::from(InstallError::EXIT_CODE)
        }
    }
}
