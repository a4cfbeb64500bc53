//! # Error Handling
//!
//! This module defines the centralized error type for `cannon`. It uses the
//! `thiserror` library to create a single `Error` enum covering every failure
//! mode of the action engine and the repository pipeline.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into a few groups:
//!   - configuration problems detected before any I/O (`ConfigParse`,
//!     `Validation`, `UnsupportedActionType`);
//!   - action failures (`Compile`, `UnknownVariable`, `Io`, `AlreadyExists`,
//!     `NotExist`, `Command`);
//!   - collaborator failures (`GitCommand`, `GitHub`, `Http`);
//!   - pipeline control (`StageTimeout`, `Cancelled`);
//!   - context wrappers (`Repository`, `Action`) that attach the repository
//!     name and action description to an underlying cause.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for cannon operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be read or has the wrong shape.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An action configuration is missing a required field or is otherwise
    /// invalid.
    #[error("Invalid action configuration: {message}")]
    Validation { message: String },

    /// The `type` of an action configuration is not one cannon knows about.
    #[error("Unsupported action type {r#type:?}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnsupportedActionType {
        r#type: String,
        hint: Option<String>,
    },

    /// The search text of a text action is not a valid regular expression.
    #[error("Unable to compile regex {pattern:?}: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A `${NAME}` placeholder had no value in the supplied arguments.
    #[error("Failed to expand variables in {context}: unknown variable {name:?}")]
    UnknownVariable { name: String, context: String },

    /// A filesystem operation failed. `context` names the path involved.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A create-only file action found its destination already present.
    #[error("File {} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    /// A file action required an existing destination and found none.
    #[error("File {} does not exist", path.display())]
    NotExist { path: PathBuf },

    /// A command action could not be spawned or exited unsuccessfully.
    #[error("Failed to run command {command} at {}: {stderr}: {source}", dir.display())]
    Command {
        command: String,
        dir: PathBuf,
        stderr: String,
        #[source]
        source: std::io::Error,
    },

    /// A `git` invocation failed.
    #[error("Git command failed for {repo}: {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
    },

    /// The GitHub API answered with an unexpected status.
    #[error("GitHub API error for {repo}: got {status} response: {message}")]
    GitHub {
        repo: String,
        status: u16,
        message: String,
    },

    /// An HTTP transport error, wrapped from `reqwest::Error`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stage ran past its wall-clock ceiling.
    #[error("Stage {stage:?} timed out after {}s", timeout.as_secs_f64())]
    StageTimeout { stage: String, timeout: Duration },

    /// The run was cancelled, either by a sibling failure or an interrupt.
    #[error("Operation cancelled")]
    Cancelled,

    /// A per-repository stage failure.
    #[error("{repo}: {source}")]
    Repository {
        repo: String,
        #[source]
        source: Box<Error>,
    },

    /// An action failed while running against a repository.
    #[error("{repo}: failed to run action `{action}`: {source}")]
    Action {
        repo: String,
        action: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps `self` with the name of the repository it happened in.
    pub fn in_repository(self, repo: impl Into<String>) -> Self {
        Error::Repository {
            repo: repo.into(),
            source: Box::new(self),
        }
    }

    /// Builds an `Io` error with the given context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Reports whether this error is, at its root, a cancellation.
    ///
    /// Context wrappers are looked through, so a `Repository` wrapping
    /// `Cancelled` counts.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Repository { source, .. } | Error::Action { source, .. } => {
                source.is_cancellation()
            }
            _ => false,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
