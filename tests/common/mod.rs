//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::MINIMAL);
//!     // ... test code
//! }
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use assert_fs::prelude::*;

use cannon::actions::Target;
use cannon::cancel::CancellationToken;
use cannon::config::RepoConfig;
use cannon::error::{Error, Result};
use cannon::repository::{Repository, RepositoryProvider};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
pub mod configs {
    /// One repository, one text action using a repository variable.
    pub const MINIMAL: &str = r#"
repos:
  - name: Acme/widgets
actions:
  - type: appendText
    searchText: "^# .*"
    applyText: "\n\nMaintained by ${REPO_OWNER}"
    path: README.md
"#;

    /// A text action missing its apply text.
    pub const INVALID_ACTION: &str = r#"
repos:
  - name: Acme/widgets
actions:
  - type: replaceLine
    searchText: "x"
    path: README.md
"#;

    /// An action type that does not exist.
    pub const UNKNOWN_TYPE: &str = r#"
repos:
  - name: Acme/widgets
actions:
  - type: replaceLines
    searchText: "x"
    applyText: "y"
    path: README.md
"#;
}

/// A temporary directory holding a `cannon.yml` and a checkout cache.
pub struct TestFixture {
    pub temp: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: assert_fs::TempDir::new().unwrap(),
        }
    }

    pub fn with_config(self, yaml: &str) -> Self {
        self.temp.child("cannon.yml").write_str(yaml).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("cannon.yml")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.temp.path().join("cache")
    }

    pub fn remotes_dir(&self) -> PathBuf {
        self.temp.path().join("remotes")
    }

    /// Create a bare remote `<remotes>/<name>.git` whose `master` branch
    /// holds `files`.
    pub fn with_remote(self, name: &str, files: &[(&str, &str)]) -> Self {
        let bare = self.remotes_dir().join(format!("{name}.git"));
        fs::create_dir_all(&bare).unwrap();
        git(&bare, &["init", "--bare", "-q", "-b", "master"]);

        let seed = self.temp.path().join("seed").join(name);
        fs::create_dir_all(&seed).unwrap();
        git(&seed, &["init", "-q", "-b", "master"]);
        for (path, content) in files {
            let file = seed.join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "-q", "-m", "initial"]);
        git(&seed, &["push", "-q", bare.to_str().unwrap(), "master"]);
        self
    }
}

/// Identity for commits made by tests and by the binary under test.
pub const GIT_IDENTITY: &[(&str, &str)] = &[
    ("GIT_AUTHOR_NAME", "Cannon Test"),
    ("GIT_AUTHOR_EMAIL", "cannon@example.com"),
    ("GIT_COMMITTER_NAME", "Cannon Test"),
    ("GIT_COMMITTER_EMAIL", "cannon@example.com"),
];

/// Run git in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(GIT_IDENTITY.iter().copied())
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Calls made against a [`DirProvider`]'s repositories, in call order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Provider handing out plain directories under `root`, seeded with
/// `files`, and recording every repository call.
pub struct DirProvider {
    pub root: PathBuf,
    pub files: Vec<(String, String)>,
    pub log: CallLog,
}

impl DirProvider {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files: Vec::new(),
            log: CallLog::default(),
        }
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl RepositoryProvider for DirProvider {
    type Repo = DirRepository;

    fn prepare(&self, token: &CancellationToken, repo: &RepoConfig) -> Result<DirRepository> {
        token.check()?;
        let path = self.root.join(&repo.name);
        fs::create_dir_all(&path).map_err(|e| Error::io("failed to create checkout", e))?;
        for (file, content) in &self.files {
            fs::write(path.join(file), content)
                .map_err(|e| Error::io("failed to seed checkout", e))?;
        }
        self.log.lock().unwrap().push(format!("prepare {}", repo.name));
        Ok(DirRepository {
            name: repo.name.clone(),
            path,
            log: Arc::clone(&self.log),
        })
    }
}

pub struct DirRepository {
    name: String,
    path: PathBuf,
    log: CallLog,
}

impl DirRepository {
    fn record(&self, op: &str) {
        self.log.lock().unwrap().push(format!("{op} {}", self.name));
    }
}

impl Target for DirRepository {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Repository for DirRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_branch(&mut self, _branch: &str) -> Result<()> {
        self.record("branch");
        Ok(())
    }

    fn commit_changes(&mut self, token: &CancellationToken, _message: &str) -> Result<()> {
        token.check()?;
        self.record("commit");
        Ok(())
    }

    fn push(&mut self, token: &CancellationToken) -> Result<()> {
        token.check()?;
        self.record("push");
        Ok(())
    }

    fn create_pr(
        &self,
        token: &CancellationToken,
        branch: &str,
        description: &str,
    ) -> Result<String> {
        token.check()?;
        self.record("pr");
        self.log
            .lock()
            .unwrap()
            .push(format!("description {}: {description}", self.name));
        Ok(format!("https://example.com/{}/pull/{branch}", self.name))
    }
}
