//! End-to-end tests for the `run` command.
//!
//! Repositories are served from local bare remotes through
//! `--clone-url-prefix`, so a run clones, commits and pushes without any
//! network access. Pull requests are never opened here; `--no-pr` prints
//! the manual pull request links instead.

mod common;

use std::path::PathBuf;

use common::prelude::*;
use common::{git, GIT_IDENTITY};

fn run_cmd(fixture: &TestFixture) -> assert_cmd::Command {
    let mut prefix = fixture.remotes_dir().into_os_string();
    prefix.push("/");

    let mut cmd = cargo_bin_cmd!("cannon");
    cmd.current_dir(fixture.path())
        .envs(GIT_IDENTITY.iter().copied())
        .env_remove("GITHUB_TOKEN")
        .env("CANNON_CACHE", fixture.cache_dir())
        .env("CANNON_CLONE_URL_PREFIX", prefix)
        .args(["--color", "never", "run", "--yes"]);
    cmd
}

fn checkout(fixture: &TestFixture, name: &str) -> PathBuf {
    fixture.cache_dir().join(name)
}

#[test]
fn test_run_missing_config() {
    let fixture = TestFixture::new();

    cargo_bin_cmd!("cannon")
        .current_dir(fixture.path())
        .env_remove("CANNON_CONFIG")
        .args(["run", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_run_invalid_action_stops_before_cloning() {
    let fixture = TestFixture::new().with_config(configs::INVALID_ACTION);

    run_cmd(&fixture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse action config"))
        .stderr(predicate::str::contains("missing apply text"));
    assert!(!fixture.cache_dir().join("Acme").exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_run_no_push_commits_locally() {
    let fixture = TestFixture::new()
        .with_config(configs::MINIMAL)
        .with_remote("Acme/widgets", &[("README.md", "# Widgets\n")]);

    run_cmd(&fixture)
        .args(["--no-push", "-m", "Add maintainer note"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Affected repos:\n- Acme/widgets"))
        .stdout(predicate::str::contains("[OK] Changes applied"))
        .stdout(predicate::str::contains("Pull Request URLs").not());

    let repo = checkout(&fixture, "Acme/widgets");
    assert_eq!(
        std::fs::read_to_string(repo.join("README.md")).unwrap(),
        "# Widgets\n\nMaintained by Acme\n"
    );
    assert!(git(&repo, &["rev-parse", "--abbrev-ref", "HEAD"]).starts_with("cannon/change-"));
    assert_eq!(git(&repo, &["log", "-1", "--format=%s"]), "Add maintainer note");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_run_no_pr_pushes_branch() {
    let fixture = TestFixture::new()
        .with_config(configs::MINIMAL)
        .with_remote("Acme/widgets", &[("README.md", "# Widgets\n")]);

    run_cmd(&fixture)
        .arg("--no-pr")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Pull Request URLs:\n- Acme/widgets: https://github.com/Acme/widgets/pull/new/cannon/change-",
        ));

    let bare = fixture.remotes_dir().join("Acme/widgets.git");
    let branches = git(&bare, &["branch", "--list", "cannon/change-*"]);
    assert!(!branches.is_empty());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_second_run_starts_from_clean_base() {
    let fixture = TestFixture::new()
        .with_config(configs::MINIMAL)
        .with_remote("Acme/widgets", &[("README.md", "# Widgets\n")]);

    run_cmd(&fixture).arg("--no-push").assert().success();
    let repo = checkout(&fixture, "Acme/widgets");
    let first = git(&repo, &["rev-parse", "--abbrev-ref", "HEAD"]);

    run_cmd(&fixture).arg("--no-push").assert().success();

    // The second run rebuilt the change on master rather than on top of the
    // first run's branch.
    assert_eq!(
        std::fs::read_to_string(repo.join("README.md")).unwrap(),
        "# Widgets\n\nMaintained by Acme\n"
    );
    let branches = git(&repo, &["branch", "--list", &first]);
    assert!(branches.is_empty());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_run_reports_failing_repository() {
    let fixture = TestFixture::new()
        .with_config(
            r#"
repos:
  - name: Acme/widgets
actions:
  - type: runCommand
    run: "false"
"#,
        )
        .with_remote("Acme/widgets", &[("README.md", "# Widgets\n")]);

    run_cmd(&fixture)
        .arg("--no-push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run stopped while running actions"))
        .stderr(predicate::str::contains("Acme/widgets"));
}
