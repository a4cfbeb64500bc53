//! # Run Command Implementation
//!
//! Loads `cannon.yml`, shows the planned change and, once confirmed, runs the
//! full pipeline: prepare every repository, apply the actions, commit, then
//! push and open pull requests.
//!
//! Ctrl-C cancels the run cooperatively. Work already done in checkouts is
//! left in place and cleaned up by the next run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use log::debug;

use cannon::cancel::CancellationToken;
use cannon::config;
use cannon::defaults;
use cannon::output::{emoji, format_plan, format_report, OutputConfig};
use cannon::phases::orchestrator::{Pipeline, PipelineOptions};
use cannon::repository::{GitProvider, GitProviderConfig};
use cannon::suggestions;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the cannon.yml config file
    #[arg(short, long, value_name = "PATH", env = "CANNON_CONFIG", default_value = defaults::CONFIG_FILE)]
    pub path: PathBuf,

    /// Commit message to use
    #[arg(short = 'm', long, value_name = "MESSAGE", default_value = defaults::COMMIT_MESSAGE)]
    pub commit_message: String,

    /// Commit only; do not push to the remote
    #[arg(long)]
    pub no_push: bool,

    /// Push without opening pull requests
    #[arg(long)]
    pub no_pr: bool,

    /// Show detailed progress information
    #[arg(short, long)]
    pub verbose: bool,

    /// Remove the checkout cache before running
    #[arg(long)]
    pub clean: bool,

    /// Directory holding repository checkouts
    ///
    /// If not provided, it defaults to the system's cache directory
    /// (e.g., `~/.cache/cannon` on Linux).
    #[arg(long, value_name = "DIR", env = "CANNON_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Prefix joined with `owner/name.git` to form clone URLs
    #[arg(long, value_name = "PREFIX", env = "CANNON_CLONE_URL_PREFIX")]
    pub clone_url_prefix: Option<String>,

    /// Base URL of the GitHub API, for GitHub Enterprise hosts
    #[arg(long, value_name = "URL", env = "CANNON_GITHUB_API")]
    pub github_api: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Cap on repositories processed at once (default: all of them)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Abort a stage that runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub stage_timeout: Option<u64>,
}

/// Execute the run command
pub fn execute(args: RunArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if !args.path.exists() {
        return Err(suggestions::config_not_found(&args.path));
    }
    let config = config::from_file(&args.path)?;
    let actions = config
        .parse_actions()
        .context("failed to parse action config")?;

    let cache_root = args
        .cache_root
        .clone()
        .unwrap_or_else(defaults::default_cache_root);
    prepare_cache(&cache_root, args.clean)?;

    println!("{}", format_plan(&config.repos, &actions));
    if !args.yes && !confirm()? {
        println!("Aborting");
        return Ok(());
    }
    println!();

    let token = CancellationToken::new();
    signal_hook::flag::register(signal_hook::consts::SIGINT, token.flag())
        .context("failed to install interrupt handler")?;

    let mut provider_config = GitProviderConfig::new(cache_root);
    if let Some(prefix) = args.clone_url_prefix {
        provider_config.clone_url_prefix = prefix;
    }
    if let Some(api_url) = args.github_api {
        provider_config.api_url = api_url;
    }
    let provider = GitProvider::new(provider_config)?;
    let options = PipelineOptions {
        branch: defaults::branch_name(),
        commit_message: args.commit_message,
        push: !args.no_push,
        create_pr: !args.no_pr,
        jobs: args.jobs,
        stage_timeout: args.stage_timeout.map(Duration::from_secs),
        show_progress: !args.verbose,
    };
    debug!("Using branch {}", options.branch);

    let mut pipeline = Pipeline::new(provider, actions, options);
    let report = pipeline
        .run(&token, &config.repos)
        .with_context(|| format!("run stopped while {}", pipeline.last_stage()))?;

    println!("{} Changes applied", emoji(&out, "✅", "[OK]"));
    if !args.no_push {
        print!("{}", format_report(&report));
    }
    Ok(())
}

fn prepare_cache(cache_root: &Path, clean: bool) -> Result<()> {
    if clean {
        match fs::remove_dir_all(cache_root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to clean cannon directory at {}", cache_root.display())
                })
            }
        }
    }
    fs::create_dir_all(cache_root).with_context(|| {
        format!("failed to create cannon directory at {}", cache_root.display())
    })
}

fn confirm() -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Confirm running with these parameters?")
        .default(false)
        .interact()?;
    Ok(confirmed)
}
