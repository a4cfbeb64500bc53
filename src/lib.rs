//! # Cannon Library
//!
//! This library applies the same declarative change to many repositories at
//! once: it edits files, creates or deletes them and runs commands in every
//! checkout, then commits, pushes and opens a pull request per repository. It
//! is designed to be used by the `cannon` command-line tool but can also be
//! embedded with a custom [`repository::RepositoryProvider`].
//!
//! ## Quick Example
//!
//! ```
//! use cannon::actions::{self, ActionConfig, Arguments};
//! use cannon::cancel::CancellationToken;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("README.md"), "# HYPE ZONE\nbody\n").unwrap();
//!
//! let action = actions::parse(&ActionConfig {
//!     r#type: "replaceLine".into(),
//!     search_text: "# HYPE ZONE".into(),
//!     apply_text: "# ${REPO_NAME}".into(),
//!     path: "README.md".into(),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let args = Arguments::for_repository("Acme/widgets");
//! let message = action.run(&CancellationToken::new(), dir.path(), &args).unwrap();
//! assert_eq!(message, "Replaced line `# HYPE ZONE` with `# widgets` in `README.md`");
//! ```
//!
//! ## Core Concepts
//!
//! - **Actions (`actions`)**: Immutable, parsed mutations. Text actions edit
//!   file contents with regular expressions, file actions create, replace or
//!   delete whole files, and command actions run programs.
//! - **Variables (`variables`)**: `${NAME}` placeholders in text and file
//!   content, filled from per-repository [`actions::Arguments`].
//! - **Repositories (`repository`, `git`, `github`)**: Prepared checkouts
//!   behind a trait, with a default implementation on the system `git`
//!   command and the GitHub API.
//! - **Phases (`phases`)**: The staged, parallel pipeline with cooperative
//!   cancellation ([`cancel`]).
//!
//! ## Execution Flow
//!
//! [`phases::orchestrator::Pipeline`] runs these stages, each across all
//! repositories before the next:
//!
//! 1.  **Preparing**: Clone or clean each checkout and create the run branch.
//! 2.  **Running actions**: Apply every action, in order, to each checkout.
//! 3.  **Committing**: Commit the changes.
//! 4.  **Publishing**: Push the branch and open a pull request.

pub mod actions;
pub mod cancel;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod output;
pub mod phases;
pub mod progress;
pub mod repository;
pub mod suggestions;
pub mod variables;

#[cfg(test)]
mod variables_proptest;
