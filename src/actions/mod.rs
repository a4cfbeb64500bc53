//! # Actions
//!
//! An [`Action`] is one configured mutation applied to a repository checkout.
//! Actions come in three families:
//!
//! - **Text actions** ([`text`]): regex edits inside a single file.
//! - **File actions** ([`file`]): create, replace or delete a whole file.
//! - **Command actions** ([`command`]): run a program in the repository root.
//!
//! Actions are built once by [`parse`] from an [`ActionConfig`] and never
//! change afterwards. [`Action::run`] only reads `self`, so the same action
//! list is shared by every repository task in the pipeline. File actions read
//! their source file during parsing, so the source is read from disk once per
//! run no matter how many repositories it is applied to.

pub mod command;
pub mod file;
pub mod text;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::suggestions;
use crate::variables;

pub use command::CommandAction;
pub use file::{FileAction, FileOp, SourceFile};
pub use text::{TextAction, TextOp};

/// Declarative description of an action, as found in the config file.
///
/// All fields except `type` are optional here; which ones are required
/// depends on the action family and is checked by [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    /// Identifies the kind of action, e.g. `replaceLine` or `createFile`.
    #[serde(rename = "type")]
    pub r#type: String,

    /// Regex to search for in a text action.
    #[serde(default)]
    pub search_text: String,
    /// Text to apply in a text action.
    #[serde(default)]
    pub apply_text: String,
    /// File a text action edits, relative to the repository root.
    #[serde(default)]
    pub path: String,

    /// Source file of a file action, relative to the working directory.
    #[serde(default)]
    pub src_path: String,
    /// Destination of a file action, relative to the repository root.
    #[serde(default)]
    pub dst_path: String,

    /// Command line of a command action.
    #[serde(default)]
    pub run: String,
}

/// Anything an action can be applied to.
pub trait Target {
    /// Root directory that action paths are resolved against.
    fn path(&self) -> &Path;
}

impl Target for Path {
    fn path(&self) -> &Path {
        self
    }
}

impl Target for PathBuf {
    fn path(&self) -> &Path {
        self
    }
}

/// Variables every repository run defines.
pub const REPOSITORY_VARIABLES: &[&str] = &["REPO_OWNER", "REPO_NAME"];

/// Extra inputs supplied when running an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    /// Values for `${NAME}` placeholders in text and file content.
    pub variables: HashMap<String, String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Variables for a repository named `owner/name`: `REPO_OWNER` and
    /// `REPO_NAME`.
    pub fn for_repository(full_name: &str) -> Self {
        let (owner, name) = full_name.split_once('/').unwrap_or(("", full_name));
        Self::new()
            .with_variable("REPO_OWNER", owner)
            .with_variable("REPO_NAME", name)
    }
}

/// A parsed, ready-to-run action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Text(TextAction),
    File(FileAction),
    Command(CommandAction),
}

impl Action {
    /// Apply the action to `target` and describe what changed.
    ///
    /// The returned message is a single line suitable for a pull request
    /// description.
    pub fn run<T: Target + ?Sized>(
        &self,
        token: &CancellationToken,
        target: &T,
        args: &Arguments,
    ) -> Result<String> {
        token.check()?;
        match self {
            Action::Text(a) => a.run(token, target.path(), args),
            Action::File(a) => a.run(token, target.path(), args),
            Action::Command(a) => a.run(token, target.path()),
        }
    }

    /// The config `type` this action was parsed from.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Text(a) => a.op().type_name(),
            Action::File(a) => a.op().type_name(),
            Action::Command(a) => a.type_name(),
        }
    }

    /// `${NAME}` placeholders in the content this action expands, in order
    /// of appearance. Commands are never expanded.
    pub fn placeholders(&self) -> Vec<String> {
        match self {
            Action::Text(a) => {
                let mut names = variables::placeholders(a.search_text().as_bytes());
                if let Some(apply) = a.op().apply_text() {
                    names.extend(variables::placeholders(apply.as_bytes()));
                }
                names
            }
            Action::File(a) => match a.op() {
                FileOp::Create(src) | FileOp::Replace(src) | FileOp::CreateOrReplace(src) => {
                    variables::placeholders(&src.data)
                }
                FileOp::Delete => Vec::new(),
            },
            Action::Command(_) => Vec::new(),
        }
    }

    /// One-line description used in error context.
    pub fn summary(&self) -> String {
        match self {
            Action::Text(a) => format!("{} `{}` in {}", self.type_name(), a.search_text(), a.path()),
            Action::File(a) => format!("{} {}", self.type_name(), a.dst()),
            Action::Command(a) => format!("{} `{}`", self.type_name(), a.command()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Text(a) => fmt::Display::fmt(a, f),
            Action::File(a) => fmt::Display::fmt(a, f),
            Action::Command(a) => fmt::Display::fmt(a, f),
        }
    }
}

/// Validate `config` and build the action it describes.
///
/// The family is chosen from the suffix of `type`: `...Text` and `...Line`
/// are text actions, `...File` file actions and `...Command` command actions.
/// File actions read their source file here.
pub fn parse(config: &ActionConfig) -> Result<Action> {
    let t = config.r#type.as_str();
    if t.ends_with("Text") || t.ends_with("Line") {
        text::parse(config).map(Action::Text)
    } else if t.ends_with("File") {
        file::parse(config).map(Action::File)
    } else if t.ends_with("Command") {
        command::parse(config).map(Action::Command)
    } else {
        Err(unsupported(t))
    }
}

/// Parse every config in order, stopping at the first invalid one.
pub fn parse_all(configs: &[ActionConfig]) -> Result<Vec<Action>> {
    configs
        .iter()
        .enumerate()
        .map(|(i, c)| {
            parse(c).map_err(|e| match e {
                Error::Validation { message } => Error::Validation {
                    message: format!("action {} ({}): {}", i + 1, c.r#type, message),
                },
                other => other,
            })
        })
        .collect()
}

pub(crate) fn unsupported(action_type: &str) -> Error {
    Error::UnsupportedActionType {
        r#type: action_type.to_string(),
        hint: Some(suggestions::action_type_hint(action_type)),
    }
}

pub(crate) fn missing(what: &str, family: &str) -> Error {
    Error::Validation {
        message: format!("missing {what} for {family} action"),
    }
}
