//! Thin wrappers over the system `git` binary.
//!
//! Using the system command means authentication is whatever the user has
//! already configured:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig
//!
//! Every helper takes the repository's `owner/name` only to label errors.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Run `git <args>` in `dir` and return its trimmed stdout.
pub fn git(dir: &Path, repo: &str, args: &[&str]) -> Result<String> {
    let command = args.join(" ");
    debug!("{repo}: git {command}");

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            repo: repo.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command,
            repo: repo.to_string(),
            stderr: auth_hint(stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Provide a helpful message for common auth failures.
fn auth_hint(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository.\n\
            For private repos, ensure you have:\n\
            - SSH key added to ssh-agent\n\
            - Git credentials configured\n\
            - Personal access token set up\n\
            Error: {}",
            stderr
        )
    } else {
        stderr.to_string()
    }
}

/// Clone `url` into `target_dir`, creating parent directories as needed.
pub fn clone(url: &str, target_dir: &Path, repo: &str) -> Result<()> {
    let parent = target_dir.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|e| Error::io(format!("failed to create directory {}", parent.display()), e))?;

    let target = target_dir.to_string_lossy();
    git(parent, repo, &["clone", url, &target])?;
    Ok(())
}

/// Name of the branch `HEAD` points at.
pub fn current_branch(dir: &Path, repo: &str) -> Result<String> {
    git(dir, repo, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Discard every local change: untracked files and directories are removed
/// and tracked files reset to `HEAD`.
pub fn discard_changes(dir: &Path, repo: &str) -> Result<()> {
    git(dir, repo, &["reset", "--hard", "--quiet"])?;
    git(dir, repo, &["clean", "-fdq"])?;
    Ok(())
}

/// Force-checkout an existing branch, discarding local changes.
pub fn checkout_force(dir: &Path, repo: &str, branch: &str) -> Result<()> {
    git(dir, repo, &["checkout", "--force", "--quiet", branch])?;
    Ok(())
}

pub fn delete_branch(dir: &Path, repo: &str, branch: &str) -> Result<()> {
    git(dir, repo, &["branch", "-D", "--quiet", branch])?;
    Ok(())
}

/// Fast-forward the current branch from its upstream.
pub fn pull(dir: &Path, repo: &str) -> Result<()> {
    git(dir, repo, &["pull", "--ff-only", "--quiet"])?;
    Ok(())
}

/// Create `branch` at `HEAD` and switch to it.
pub fn create_branch(dir: &Path, repo: &str, branch: &str) -> Result<()> {
    git(dir, repo, &["checkout", "--quiet", "-b", branch])?;
    Ok(())
}

/// Stage everything in the working tree and commit it.
pub fn commit_all(dir: &Path, repo: &str, message: &str) -> Result<()> {
    git(dir, repo, &["add", "."])?;
    git(dir, repo, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Push `branch` to `origin`.
pub fn push(dir: &Path, repo: &str, branch: &str) -> Result<()> {
    git(dir, repo, &["push", "--quiet", "--set-upstream", "origin", branch])?;
    Ok(())
}
