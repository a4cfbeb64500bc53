//! # Cannon CLI
//!
//! This is the binary entry point for the `cannon` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating top-level errors into user-friendly output and exit codes.
//!   An interrupted run exits with status 130.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancellation(&e) => {
            eprintln!("\nOperation cancelled");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<cannon::error::Error>()
            .is_some_and(cannon::error::Error::is_cancellation)
    })
}
