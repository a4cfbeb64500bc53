//! # Output Configuration
//!
//! Colour and emoji decisions for CLI output, plus the text blocks the CLI
//! prints before and after a run.
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;
use std::fmt::Write;

use crate::actions::Action;
use crate::config::RepoConfig;
use crate::phases::orchestrator::PipelineReport;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color`
    /// flag ("always", "never" or "auto").
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        console::set_colors_enabled(use_color);
        console::set_colors_enabled_stderr(use_color);

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// The listing shown before confirming a run: affected repositories, then
/// each action's multi-line description.
pub fn format_plan(repos: &[RepoConfig], actions: &[Action]) -> String {
    let mut out = String::from("Affected repos:\n");
    for repo in repos {
        let _ = writeln!(out, "- {}", repo.name);
    }
    out.push_str("\nActions to perform:\n");
    for action in actions {
        let _ = writeln!(out, "- {action}\n");
    }
    out
}

/// `Pull Request URLs:` followed by one `- repo: url` line per published
/// repository, in configuration order.
pub fn format_report(report: &PipelineReport) -> String {
    let mut out = String::from("Pull Request URLs:\n");
    for (repo, url) in report.pr_urls() {
        let _ = writeln!(out, "- {repo}: {url}");
    }
    out
}
