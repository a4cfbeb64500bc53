//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Cannon - Apply the same change across many repositories
#[derive(Parser, Debug)]
#[command(name = "cannon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply the actions in cannon.yml to every listed repository
    Run(commands::run::RunArgs),

    /// Check a cannon.yml file without touching any repository
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let verbose = matches!(&self.command, Commands::Run(args) if args.verbose);
        let level = if verbose { "debug" } else { self.log_level.as_str() };
        init_logging(level);

        match self.command {
            Commands::Run(args) => commands::run::execute(args, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
        }
    }
}

/// `RUST_LOG` wins over `level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when embedded in tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
