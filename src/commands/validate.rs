//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a
//! `cannon.yml` file without cloning or touching any repository.
//!
//! ## Functionality
//!
//! - **Configuration Validation**: Parses the file and checks repository names.
//! - **Action Validation**: Builds every action, reporting each invalid one
//!   rather than stopping at the first.
//! - **Variable Validation**: Flags `${NAME}` placeholders that no repository
//!   run defines, since those would fail every repository at run time.
//!
//! This command is a safe, read-only operation that does not modify any files.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use cannon::actions::{self, REPOSITORY_VARIABLES};
use cannon::config;
use cannon::defaults;
use cannon::output::{emoji, OutputConfig};
use cannon::suggestions;

/// Validate a cannon.yml configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the cannon.yml config file
    #[arg(short, long, value_name = "PATH", env = "CANNON_CONFIG", default_value = defaults::CONFIG_FILE)]
    pub path: PathBuf,

    /// Use strict validation (fail on warnings).
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = &args.path;
    println!(
        "{} Validating configuration: {}",
        emoji(&out, "🔍", "[SCAN]"),
        config_path.display()
    );

    if !config_path.exists() {
        return Err(suggestions::config_not_found(config_path));
    }

    let config = match config::from_file(config_path) {
        Ok(config) => {
            println!(
                "{} Configuration file parsed successfully",
                emoji(&out, "✅", "[OK]")
            );
            config
        }
        Err(e) => {
            println!(
                "{} Configuration parsing failed: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow::anyhow!("Configuration parsing failed: {}", e));
        }
    };

    let mut has_warnings = false;
    let mut has_errors = false;

    println!("\n{} Configuration Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Repositories: {}", config.repos.len());
    println!("   Actions: {}", config.actions.len());

    if config.repos.is_empty() {
        println!("{} No repositories listed", emoji(&out, "⚠️", "[WARN]"));
        has_warnings = true;
    }
    if config.actions.is_empty() {
        println!("{} No actions listed", emoji(&out, "⚠️", "[WARN]"));
        has_warnings = true;
    }

    let mut seen = HashSet::new();
    for repo in &config.repos {
        if !seen.insert(repo.name.as_str()) {
            println!(
                "{} Repository {} is listed more than once",
                emoji(&out, "⚠️", "[WARN]"),
                repo.name
            );
            has_warnings = true;
        }
    }

    println!("\n{} Validating actions...", emoji(&out, "🔍", "[SCAN]"));
    for (idx, action_config) in config.actions.iter().enumerate() {
        let action = match actions::parse(action_config) {
            Ok(action) => action,
            Err(e) => {
                println!(
                    "{} Invalid action {} ({}): {}",
                    emoji(&out, "❌", "[ERR]"),
                    idx + 1,
                    action_config.r#type,
                    e
                );
                has_errors = true;
                continue;
            }
        };

        for name in action.placeholders() {
            if !REPOSITORY_VARIABLES.contains(&name.as_str()) {
                println!(
                    "{} Action {} ({}) uses undefined variable ${{{}}}",
                    emoji(&out, "❌", "[ERR]"),
                    idx + 1,
                    action.type_name(),
                    name
                );
                has_errors = true;
            }
        }
    }

    if !has_errors {
        println!("{} All actions are valid", emoji(&out, "✅", "[OK]"));
    }

    println!("\n{} Validation Result:", emoji(&out, "🎯", "[RESULT]"));

    if has_errors {
        println!(
            "{} Configuration has errors that must be fixed",
            emoji(&out, "❌", "[ERR]")
        );
        return Err(anyhow::anyhow!("Configuration validation failed"));
    }

    if has_warnings && args.strict {
        println!(
            "{} Configuration has warnings (strict mode enabled)",
            emoji(&out, "❌", "[ERR]")
        );
        return Err(anyhow::anyhow!(
            "Configuration validation failed in strict mode"
        ));
    }

    if has_warnings {
        println!(
            "{} Configuration is valid but has warnings",
            emoji(&out, "⚠️", "[WARN]")
        );
    } else {
        println!("{} Configuration is valid", emoji(&out, "✅", "[OK]"));
    }

    Ok(())
}
