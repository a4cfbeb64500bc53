//! Default values for cannon configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Config file read when `--path` is not given.
pub const CONFIG_FILE: &str = "cannon.yml";

/// Commit message used when `--commit-message` is not given.
pub const COMMIT_MESSAGE: &str = "Apply commit-cannon changes";

/// Prefix of the branch every run creates.
pub const BRANCH_PREFIX: &str = "cannon/change-";

/// Base branch of a repository without an explicit `base`.
pub fn base_branch() -> String {
    "master".to_string()
}

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/cannon` (XDG Base Directory)
/// - macOS: `~/Library/Caches/cannon`
/// - Windows: `{FOLDERID_LocalAppData}\cannon`
///
/// Falls back to `.cannon-cache` in the current directory if the platform
/// cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `CANNON_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cannon-cache"))
        .join("cannon")
}

/// A fresh branch name: [`BRANCH_PREFIX`] plus 16 random hex digits.
pub fn branch_name() -> String {
    format!("{BRANCH_PREFIX}{:016x}", rand::random::<u64>())
}
