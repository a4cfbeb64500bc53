//! # Configuration File
//!
//! This module defines the `cannon.yml` schema and the logic for loading it.
//!
//! ```yaml
//! repos:
//!   - name: Acme/widgets
//!     base: main
//!   - name: Acme/gadgets
//! actions:
//!   - type: replaceLine
//!     searchText: "^version = .*"
//!     applyText: "version = 2"
//!     path: Cargo.toml
//! ```
//!
//! Loading only checks the *shape* of the file and the repository names.
//! Action configurations are validated separately by
//! [`crate::actions::parse_all`], so a config can be loaded and inspected even
//! when one of its actions is invalid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::{self, Action, ActionConfig};
use crate::defaults;
use crate::error::{Error, Result};
use crate::suggestions;

/// A repository to apply actions to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// GitHub name in `owner/name` form.
    pub name: String,
    /// Branch the change is based on and the pull request targets.
    #[serde(default = "defaults::base_branch")]
    pub base: String,
}

impl RepoConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: defaults::base_branch(),
        }
    }

    /// Split `owner/name` into its two halves.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        self.name.split_once('/')
    }
}

/// Top-level `cannon.yml` contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repos: Vec<RepoConfig>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

impl Config {
    /// Parse and validate every action in order.
    pub fn parse_actions(&self) -> Result<Vec<Action>> {
        actions::parse_all(&self.actions)
    }
}

/// Parses a YAML string into a [`Config`].
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("Expected top-level `repos` and `actions` lists".to_string()),
    })?;

    for repo in &config.repos {
        validate_repo_name(&repo.name)?;
    }
    Ok(config)
}

/// Parse a [`Config`] from a YAML file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io(format!("failed to read config file {}", path.display()), e)
    })?;
    parse(&content)
}

fn validate_repo_name(name: &str) -> Result<()> {
    let valid = match name.split_once('/') {
        Some((owner, repo)) => !owner.is_empty() && !repo.is_empty() && !repo.contains('/'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::ConfigParse {
            message: format!("invalid repository name {name:?}"),
            hint: Some(suggestions::repo_name_hint(name)),
        })
    }
}
