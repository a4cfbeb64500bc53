//! Stage 4: Publishing
//!
//! Pushes the run branch of every repository and opens a pull request whose
//! description lists that repository's action messages. Every repository is
//! published even if another one fails.

use log::debug;

use super::{run_parallel, StageSettings};
use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::github;
use crate::repository::Repository;

pub const NAME: &str = "PushingAndPR";
pub const MESSAGE: &str = "Pushing changes to GitHub";

/// Push every repository and return one pull request URL per repository.
///
/// `messages[i]` belongs to `repos[i]`. Without `create_pr` the returned URL
/// is the page where a pull request can be opened by hand.
pub fn execute<R: Repository>(
    token: &CancellationToken,
    settings: &StageSettings,
    repos: &mut [R],
    messages: &[Vec<String>],
    branch: &str,
    create_pr: bool,
) -> Result<Vec<String>> {
    let opts = settings.options(NAME, MESSAGE, false);

    run_parallel(token, &opts, repos, |token, i, repo| {
        let name = repo.name().to_string();
        debug!("Pushing changes for repo {name}");
        repo.push(token).map_err(|e| e.in_repository(&name))?;

        if !create_pr {
            return Ok(repo.pr_url(branch));
        }
        debug!("Creating PR for repo {name}");
        let description = github::pull_request_description(&messages[i]);
        repo.create_pr(token, branch, &description)
            .map_err(|e| e.in_repository(name))
    })
}
