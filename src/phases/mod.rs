//! The stages of a cannon run.
//!
//! ## Overview
//!
//! A run goes through four stages, each applied to every repository before
//! the next one starts:
//! 1. Preparing - clean checkout of the base branch plus a fresh run branch
//! 2. Running actions - apply every action, in order, to each checkout
//! 3. Committing - stage and commit the changes
//! 4. Publishing - push the branch and open a pull request
//!
//! Every stage is a fan-out over the repositories with [`run_parallel`]
//! followed by a barrier. Results come back indexed like the input, so later
//! stages can match them to repositories by position.

use std::time::Duration;

use log::{debug, info};
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::progress::StageProgress;

pub mod actions;
pub mod commit;
pub mod orchestrator;
pub mod prepare;
pub mod publish;

/// How a stage fans out and reports failure.
#[derive(Debug, Clone, Copy)]
pub struct StageOptions<'a> {
    /// Short name used in timeout errors, e.g. "Committing".
    pub name: &'a str,
    /// Spinner text, e.g. "Committing changes to repos".
    pub message: &'a str,
    /// Cancel sibling work as soon as one repository fails.
    pub cancel_on_error: bool,
    /// Wall-clock ceiling for the whole stage.
    pub timeout: Option<Duration>,
    pub show_progress: bool,
}

/// Settings shared by every stage of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSettings {
    pub timeout: Option<Duration>,
    pub show_progress: bool,
}

impl StageSettings {
    pub fn options<'a>(
        &self,
        name: &'a str,
        message: &'a str,
        cancel_on_error: bool,
    ) -> StageOptions<'a> {
        StageOptions {
            name,
            message,
            cancel_on_error,
            timeout: self.timeout,
            show_progress: self.show_progress,
        }
    }
}

/// Run `f` for every item concurrently and wait for all of them.
///
/// `f` gets a token for the stage, the item's index and exclusive access to
/// the item. Results are returned in input order.
///
/// With `cancel_on_error`, the first failure cancels the stage token, so
/// items that have not started yet are skipped and running ones stop at
/// their next check. Otherwise every item runs to completion. Either way the
/// error reported is the failure with the lowest index that is not a
/// cancellation; sibling `Cancelled` results only surface when nothing else
/// failed. A stage still running when its deadline passed reports
/// [`Error::StageTimeout`] whatever its items returned.
pub fn run_parallel<I, T, F>(
    token: &CancellationToken,
    opts: &StageOptions<'_>,
    items: &mut [I],
    f: F,
) -> Result<Vec<T>>
where
    I: Send,
    T: Send,
    F: Fn(&CancellationToken, usize, &mut I) -> Result<T> + Sync,
{
    info!("{}", opts.message);
    let stage_token = token.child_with_timeout(opts.timeout);
    let progress = StageProgress::start(opts.message, items.len(), opts.show_progress);

    let results: Vec<Result<T>> = items
        .par_iter_mut()
        .enumerate()
        .map(|(i, item)| {
            // Stop issuing new work once cancelled.
            let result = stage_token.check().and_then(|()| f(&stage_token, i, item));
            if let Err(e) = &result {
                debug!("{} failed for item {i}: {e}", opts.name);
                if opts.cancel_on_error {
                    stage_token.cancel();
                }
            }
            progress.inc();
            result
        })
        .collect();

    // Overrunning the deadline fails the stage even when every item
    // finished without noticing.
    if stage_token.is_expired() && !token.is_cancelled() {
        progress.error();
        return Err(Error::StageTimeout {
            stage: opts.name.to_string(),
            timeout: opts.timeout.unwrap_or_default(),
        });
    }

    match collect(results) {
        Ok(values) => {
            progress.success();
            Ok(values)
        }
        Err(e) => {
            progress.error();
            Err(e)
        }
    }
}

/// Unwrap index-ordered results, choosing the error to report.
fn collect<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut values = Vec::with_capacity(results.len());
    let mut cancelled = false;
    let mut first_error = None;

    for result in results {
        match result {
            Ok(v) => values.push(v),
            Err(e) if e.is_cancellation() => cancelled = true,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None if cancelled => Err(Error::Cancelled),
        None => Ok(values),
    }
}
