//! Stage 3: Committing
//!
//! Commits the changes in every repository. The first failure cancels the
//! other repositories.

use log::debug;

use super::{run_parallel, StageSettings};
use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::repository::Repository;

pub const NAME: &str = "Committing";
pub const MESSAGE: &str = "Committing changes to repos";

pub fn execute<R: Repository>(
    token: &CancellationToken,
    settings: &StageSettings,
    repos: &mut [R],
    message: &str,
) -> Result<()> {
    let opts = settings.options(NAME, MESSAGE, true);

    run_parallel(token, &opts, repos, |token, _, repo| {
        debug!("Committing changes to repo {}", repo.name());
        let name = repo.name().to_string();
        repo.commit_changes(token, message)
            .map_err(|e| e.in_repository(name))
    })?;
    Ok(())
}
