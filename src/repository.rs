//! # Repository Handles
//!
//! The pipeline never talks to git or GitHub directly. It goes through two
//! traits:
//!
//! - **`RepositoryProvider`**: turns a [`RepoConfig`] into a prepared
//!   [`Repository`], i.e. a clean checkout of the base branch.
//!
//! - **`Repository`**: one prepared checkout. It is a [`Target`] so actions
//!   can run against it, and it knows how to branch, commit, push and open a
//!   pull request for itself.
//!
//! In the main application, [`GitProvider`] and [`GitRepository`] are used,
//! which wrap the system `git` command and the GitHub API. In tests, these can
//! be replaced with mock implementations so the pipeline runs over plain
//! temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::actions::Target;
use crate::cancel::CancellationToken;
use crate::config::RepoConfig;
use crate::error::{Error, Result};
use crate::{git, github};

/// One prepared, exclusively owned repository checkout.
pub trait Repository: Target + Send {
    /// `owner/name` of the repository.
    fn name(&self) -> &str;

    /// Create `branch` from the current `HEAD` and switch to it.
    fn create_branch(&mut self, branch: &str) -> Result<()>;

    /// Stage every change in the working tree and commit it.
    fn commit_changes(&mut self, token: &CancellationToken, message: &str) -> Result<()>;

    /// Push the current branch to the remote.
    fn push(&mut self, token: &CancellationToken) -> Result<()>;

    /// Open a pull request for `branch` and return its URL.
    fn create_pr(&self, token: &CancellationToken, branch: &str, description: &str)
        -> Result<String>;

    /// URL where a pull request for `branch` can be opened by hand.
    fn pr_url(&self, branch: &str) -> String {
        github::new_pull_request_url(self.name(), branch)
    }
}

/// Produces prepared repositories.
pub trait RepositoryProvider: Send + Sync {
    type Repo: Repository;

    /// Obtain a clean checkout of `repo`'s base branch.
    fn prepare(&self, token: &CancellationToken, repo: &RepoConfig) -> Result<Self::Repo>;
}

/// Settings for [`GitProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitProviderConfig {
    /// Checkouts live under `<cache_root>/<owner>/<name>`.
    pub cache_root: PathBuf,
    /// Clone URL is `<clone_url_prefix><owner>/<name>.git`.
    pub clone_url_prefix: String,
    pub api_url: String,
    pub token: Option<String>,
}

impl GitProviderConfig {
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            clone_url_prefix: "git@github.com:".to_string(),
            api_url: github::API_URL.to_string(),
            token: std::env::var(github::TOKEN_VAR).ok(),
        }
    }

    pub fn clone_url(&self, name: &str) -> String {
        format!("{}{}.git", self.clone_url_prefix, name)
    }

    pub fn checkout_path(&self, name: &str) -> PathBuf {
        self.cache_root.join(name)
    }
}

/// The default provider: checkouts managed by the system `git` command.
#[derive(Debug, Clone)]
pub struct GitProvider {
    config: GitProviderConfig,
    github: github::Client,
}

impl GitProvider {
    pub fn new(config: GitProviderConfig) -> Result<Self> {
        let github = github::Client::new(config.api_url.clone(), config.token.clone())?;
        Ok(Self { config, github })
    }

    /// Bring an existing checkout back to a clean, up-to-date base branch.
    ///
    /// Runs leave checkouts on their change branch with local commits, so
    /// a checkout is always assumed dirty. The branch left behind by the
    /// previous run is deleted.
    fn reset(&self, token: &CancellationToken, path: &Path, repo: &RepoConfig) -> Result<()> {
        let name = repo.name.as_str();
        debug!("Cleaning and updating repo {name}");
        git::discard_changes(path, name)?;

        let current = git::current_branch(path, name)?;
        if current != repo.base {
            token.check()?;
            git::checkout_force(path, name, &repo.base)?;
            // Detached HEAD has no branch to delete.
            if current != "HEAD" {
                git::delete_branch(path, name, &current)?;
            }
        }

        token.check()?;
        git::pull(path, name)?;
        debug!("Updated repo {name}");
        Ok(())
    }
}

impl RepositoryProvider for GitProvider {
    type Repo = GitRepository;

    fn prepare(&self, token: &CancellationToken, repo: &RepoConfig) -> Result<GitRepository> {
        token.check()?;
        let path = self.config.checkout_path(&repo.name);

        if path.join(".git").is_dir() {
            self.reset(token, &path, repo)?;
        } else {
            debug!("Repo {} does not exist, cloning", repo.name);
            if path.exists() {
                fs::remove_dir_all(&path).map_err(|e| {
                    Error::io(format!("failed to remove directory {}", path.display()), e)
                })?;
            }
            git::clone(&self.config.clone_url(&repo.name), &path, &repo.name)?;
            git::checkout_force(&path, &repo.name, &repo.base)?;
            debug!("Cloned repo {} to {}", repo.name, path.display());
        }

        Ok(GitRepository {
            name: repo.name.clone(),
            base: repo.base.clone(),
            branch: None,
            path,
            github: self.github.clone(),
        })
    }
}

/// A checkout managed by [`GitProvider`].
#[derive(Debug)]
pub struct GitRepository {
    name: String,
    base: String,
    branch: Option<String>,
    path: PathBuf,
    github: github::Client,
}

impl Target for GitRepository {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Repository for GitRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_branch(&mut self, branch: &str) -> Result<()> {
        git::create_branch(&self.path, &self.name, branch)?;
        self.branch = Some(branch.to_string());
        Ok(())
    }

    fn commit_changes(&mut self, token: &CancellationToken, message: &str) -> Result<()> {
        token.check()?;
        git::commit_all(&self.path, &self.name, message)
    }

    fn push(&mut self, token: &CancellationToken) -> Result<()> {
        token.check()?;
        let branch = match &self.branch {
            Some(b) => b.clone(),
            None => git::current_branch(&self.path, &self.name)?,
        };
        git::push(&self.path, &self.name, &branch)
    }

    fn create_pr(
        &self,
        token: &CancellationToken,
        branch: &str,
        description: &str,
    ) -> Result<String> {
        self.github
            .create_pull_request(token, &self.name, &self.base, branch, description)
    }
}

/// In-memory doubles for stage and pipeline tests.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Calls recorded by every repository of one provider, in call order.
    pub type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    pub struct MockRepository {
        pub name: String,
        pub path: PathBuf,
        pub branch: Option<String>,
        pub commits: Vec<String>,
        pub pushed: bool,
        fail: HashSet<String>,
        log: Log,
    }

    impl MockRepository {
        pub fn new(name: &str, path: PathBuf) -> Self {
            Self {
                name: name.to_string(),
                path,
                branch: None,
                commits: Vec::new(),
                pushed: false,
                fail: HashSet::new(),
                log: Log::default(),
            }
        }

        fn record(&self, op: &str) -> Result<()> {
            if let Ok(mut log) = self.log.lock() {
                log.push(format!("{op} {}", self.name));
            }
            if self.fail.contains(op) {
                return Err(Error::GitCommand {
                    command: op.to_string(),
                    repo: self.name.clone(),
                    stderr: "mock failure".to_string(),
                });
            }
            Ok(())
        }
    }

    impl Target for MockRepository {
        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Repository for MockRepository {
        fn name(&self) -> &str {
            &self.name
        }

        fn create_branch(&mut self, branch: &str) -> Result<()> {
            self.record("branch")?;
            self.branch = Some(branch.to_string());
            Ok(())
        }

        fn commit_changes(&mut self, token: &CancellationToken, message: &str) -> Result<()> {
            token.check()?;
            self.record("commit")?;
            self.commits.push(message.to_string());
            Ok(())
        }

        fn push(&mut self, token: &CancellationToken) -> Result<()> {
            token.check()?;
            self.record("push")?;
            self.pushed = true;
            Ok(())
        }

        fn create_pr(
            &self,
            token: &CancellationToken,
            branch: &str,
            description: &str,
        ) -> Result<String> {
            token.check()?;
            self.record("pr")?;
            Ok(format!(
                "https://example.com/{}/pull/{branch}#{}",
                self.name,
                description.lines().count()
            ))
        }
    }

    /// Hands out directories under `root`; `fail` lists `"<op> <repo>"`
    /// pairs that should error, e.g. `"commit Acme/b"`.
    #[derive(Default)]
    pub struct MockProvider {
        pub root: PathBuf,
        pub fail: HashSet<String>,
        pub log: Log,
        /// Runs inside every `prepare`; returning false fails it.
        pub hook: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
    }

    impl MockProvider {
        pub fn new(root: &Path) -> Self {
            Self {
                root: root.to_path_buf(),
                ..Default::default()
            }
        }

        pub fn failing(mut self, op_and_repo: &str) -> Self {
            self.fail.insert(op_and_repo.to_string());
            self
        }

        pub fn on_prepare(mut self, hook: impl Fn() -> bool + Send + Sync + 'static) -> Self {
            self.hook = Some(Arc::new(hook));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.log.lock().map(|l| l.clone()).unwrap_or_default()
        }
    }

    impl RepositoryProvider for MockProvider {
        type Repo = MockRepository;

        fn prepare(&self, token: &CancellationToken, repo: &RepoConfig) -> Result<MockRepository> {
            token.check()?;
            let path = self.root.join(&repo.name);
            fs::create_dir_all(&path)
                .map_err(|e| Error::io(format!("failed to create {}", path.display()), e))?;
            let mut handle = MockRepository::new(&repo.name, path);
            handle.log = Arc::clone(&self.log);
            handle.fail = self
                .fail
                .iter()
                .filter_map(|f| {
                    let (op, name) = f.split_once(' ')?;
                    (name == repo.name).then(|| op.to_string())
                })
                .collect();
            handle.record("prepare")?;
            if self.hook.as_ref().is_some_and(|hook| !hook()) {
                return Err(Error::Validation {
                    message: format!("prepare hook rejected {}", repo.name),
                });
            }
            Ok(handle)
        }
    }
}
