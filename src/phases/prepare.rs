//! Stage 1: Preparing
//!
//! Obtains a clean checkout of every repository's base branch and creates the
//! run branch in it. Every repository is prepared even if another one fails,
//! so no checkout is abandoned halfway through a clone or reset. Checkouts
//! that were prepared before a failure stay on disk and are reused by the
//! next run.

use log::debug;

use super::{run_parallel, StageSettings};
use crate::cancel::CancellationToken;
use crate::config::RepoConfig;
use crate::error::Result;
use crate::repository::{Repository, RepositoryProvider};

pub const NAME: &str = "Preparing";
pub const MESSAGE: &str = "Preparing repos";

/// Prepare every repository in `repos` and switch it to `branch`.
///
/// The returned handles are in the same order as `repos`.
pub fn execute<P: RepositoryProvider>(
    token: &CancellationToken,
    settings: &StageSettings,
    provider: &P,
    repos: &[RepoConfig],
    branch: &str,
) -> Result<Vec<P::Repo>> {
    let opts = settings.options(NAME, MESSAGE, false);
    let mut configs = repos.to_vec();

    run_parallel(token, &opts, &mut configs, |token, _, config| {
        debug!("Preparing repo {}", config.name);
        let mut repo = provider
            .prepare(token, config)
            .map_err(|e| e.in_repository(&config.name))?;
        repo.create_branch(branch)
            .map_err(|e| e.in_repository(&config.name))?;
        Ok(repo)
    })
}
