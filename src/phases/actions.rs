//! Stage 2: Running actions
//!
//! Applies the action list to every repository. Within a repository the
//! actions run strictly in order, so each one sees the previous one's output.
//! The first failure cancels the other repositories.

use log::debug;

use super::{run_parallel, StageSettings};
use crate::actions::{Action, Arguments};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::repository::Repository;

pub const NAME: &str = "RunningActions";
pub const MESSAGE: &str = "Running actions on repos";

/// Run `actions` against every repository.
///
/// Returns one message list per repository, in repository order, each with
/// one message per action in action order.
pub fn execute<R: Repository>(
    token: &CancellationToken,
    settings: &StageSettings,
    repos: &mut [R],
    actions: &[Action],
) -> Result<Vec<Vec<String>>> {
    let opts = settings.options(NAME, MESSAGE, true);

    run_parallel(token, &opts, repos, |token, _, repo| {
        debug!("Running actions on repo {}", repo.name());
        let args = Arguments::for_repository(repo.name());
        let repo = &*repo;

        actions
            .iter()
            .map(|action| {
                action.run(token, repo, &args).map_err(|e| Error::Action {
                    repo: repo.name().to_string(),
                    action: action.summary(),
                    source: Box::new(e),
                })
            })
            .collect()
    })
}
