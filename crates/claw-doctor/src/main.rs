mod bootstrap_helpers;
mod commands;
mod progress;
mod report;

use std::process::ExitCode;

use clap::Parser;
use claw_cli::Cli;

use crate::bootstrap_helpers::init_tracing;
use crate::commands::run_cli;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run_cli(&cli) {
        Ok(status) => status.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
