//! Orchestrator for a complete cannon run
//!
//! This module drives the stages in order over every configured repository:
//! 1. Preparing ([`super::prepare`])
//! 2. Running actions ([`super::actions`])
//! 3. Committing ([`super::commit`])
//! 4. Pushing and opening pull requests ([`super::publish`]), unless pushing
//!    is disabled
//!
//! Each stage finishes for all repositories before the next begins. The first
//! stage error ends the run; nothing is retried at this level.

use std::fmt;
use std::time::Duration;

use log::info;

use super::{actions, commit, prepare, publish, StageSettings};
use crate::actions::Action;
use crate::cancel::CancellationToken;
use crate::config::RepoConfig;
use crate::defaults;
use crate::error::{Error, Result};
use crate::repository::{Repository, RepositoryProvider};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Preparing,
    RunningActions,
    Committing,
    PushingAndPr,
    Done,
    /// A stage failed or the run was cancelled.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Preparing => "preparing",
            PipelineState::RunningActions => "running actions",
            PipelineState::Committing => "committing",
            PipelineState::PushingAndPr => "pushing and opening pull requests",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Branch created in every repository.
    pub branch: String,
    pub commit_message: String,
    /// Push the branch after committing.
    pub push: bool,
    /// Open a pull request after pushing.
    pub create_pr: bool,
    /// Cap on worker threads; `None` runs one per repository.
    pub jobs: Option<usize>,
    /// Wall-clock ceiling for each stage.
    pub stage_timeout: Option<Duration>,
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            branch: defaults::branch_name(),
            commit_message: defaults::COMMIT_MESSAGE.to_string(),
            push: true,
            create_pr: true,
            jobs: None,
            stage_timeout: None,
            show_progress: false,
        }
    }
}

/// Outcome for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub name: String,
    /// One message per action, in action order.
    pub messages: Vec<String>,
    /// Set once the repository was published.
    pub pr_url: Option<String>,
}

/// Outcome of a successful run, one entry per repository in configuration
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub branch: String,
    pub repos: Vec<RepoReport>,
}

impl PipelineReport {
    /// `(repo, url)` pairs for every published repository.
    pub fn pr_urls(&self) -> impl Iterator<Item = (&str, &str)> {
        self.repos
            .iter()
            .filter_map(|r| r.pr_url.as_deref().map(|u| (r.name.as_str(), u)))
    }
}

pub struct Pipeline<P: RepositoryProvider> {
    provider: P,
    actions: Vec<Action>,
    options: PipelineOptions,
    state: PipelineState,
    last_stage: PipelineState,
}

impl<P: RepositoryProvider> Pipeline<P> {
    pub fn new(provider: P, actions: Vec<Action>, options: PipelineOptions) -> Self {
        Self {
            provider,
            actions,
            options,
            state: PipelineState::Idle,
            last_stage: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The last stage entered; after a failure, the stage that failed.
    pub fn last_stage(&self) -> PipelineState {
        self.last_stage
    }

    fn enter(&mut self, state: PipelineState) {
        self.state = state;
        self.last_stage = state;
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every stage over `repos`.
    ///
    /// Cancelling `token` stops the run at the next check; changes already
    /// made to checkouts are left in place.
    pub fn run(&mut self, token: &CancellationToken, repos: &[RepoConfig]) -> Result<PipelineReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("cannon-{i}"))
            .num_threads(worker_count(self.options.jobs, repos.len()))
            .build()
            .map_err(|e| Error::Validation {
            message: format!("failed to start worker pool: {e}"),
        })?;

        let result = pool.install(|| self.run_stages(token, repos));
        if result.is_err() {
            self.state = PipelineState::Failed;
        }
        result
    }

    fn run_stages(
        &mut self,
        token: &CancellationToken,
        repos: &[RepoConfig],
    ) -> Result<PipelineReport> {
        let settings = StageSettings {
            timeout: self.options.stage_timeout,
            show_progress: self.options.show_progress,
        };
        let branch = self.options.branch.clone();

        self.enter(PipelineState::Preparing);
        let mut handles = prepare::execute(token, &settings, &self.provider, repos, &branch)?;

        self.enter(PipelineState::RunningActions);
        let messages = actions::execute(token, &settings, &mut handles, &self.actions)?;

        self.enter(PipelineState::Committing);
        commit::execute(token, &settings, &mut handles, &self.options.commit_message)?;
        info!("Changes applied");

        let pr_urls = if self.options.push {
            self.enter(PipelineState::PushingAndPr);
            let urls = publish::execute(
                token,
                &settings,
                &mut handles,
                &messages,
                &branch,
                self.options.create_pr,
            )?;
            urls.into_iter().map(Some).collect()
        } else {
            vec![None; handles.len()]
        };

        self.enter(PipelineState::Done);
        let repos = handles
            .iter()
            .zip(messages)
            .zip(pr_urls)
            .map(|((repo, messages), pr_url)| RepoReport {
                name: repo.name().to_string(),
                messages,
                pr_url,
            })
            .collect();
        Ok(PipelineReport { branch, repos })
    }
}

/// One worker per repository, capped by `jobs`.
fn worker_count(jobs: Option<usize>, repos: usize) -> usize {
    let all = repos.max(1);
    jobs.map_or(all, |j| j.clamp(1, all))
}
