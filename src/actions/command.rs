//! Command actions: run a program with the repository root as working
//! directory.

use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use log::debug;

use super::{missing, unsupported, ActionConfig};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAction {
    argv: Vec<String>,
    command: String,
    shell: bool,
}

pub(super) fn parse(config: &ActionConfig) -> Result<CommandAction> {
    if config.run.trim().is_empty() {
        return Err(missing("command", "command"));
    }

    let (argv, shell) = match config.r#type.as_str() {
        "runCommand" => (
            config.run.split_whitespace().map(str::to_string).collect(),
            false,
        ),
        "shellCommand" => (
            vec!["sh".to_string(), "-c".to_string(), config.run.clone()],
            true,
        ),
        other => return Err(unsupported(other)),
    };

    Ok(CommandAction {
        argv,
        command: config.run.clone(),
        shell,
    })
}

impl CommandAction {
    pub fn type_name(&self) -> &'static str {
        if self.shell {
            "shellCommand"
        } else {
            "runCommand"
        }
    }

    /// The command line as configured.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Run the command in `root` and wait for it.
    ///
    /// The child is killed if `token` is cancelled before it exits.
    pub(super) fn run(&self, token: &CancellationToken, root: &Path) -> Result<String> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| missing("command", "command"))?;

        debug!("Running `{}` in {}", self.command, root.display());
        let mut child = Command::new(program)
            .args(args)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.failed(root, String::new(), source))?;

        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                // Keep whatever was read even if the pipe errors part way.
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                buf
            })
        });
        let collect_stderr = |reader: Option<thread::JoinHandle<Vec<u8>>>| {
            reader
                .and_then(|h| h.join().ok())
                .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
                .unwrap_or_default()
        };

        let status = loop {
            if token.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                collect_stderr(stderr_reader);
                return Err(Error::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    return Err(self.failed(root, collect_stderr(stderr_reader), source));
                }
            }
        };

        let stderr = collect_stderr(stderr_reader);
        if !status.success() {
            return Err(self.failed(root, stderr, io::Error::other(status.to_string())));
        }

        Ok(format!("Ran command `{}`", self.command))
    }

    fn failed(&self, root: &Path, stderr: String, source: io::Error) -> Error {
        Error::Command {
            command: self.command.clone(),
            dir: root.to_path_buf(),
            stderr,
            source,
        }
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run: {}", self.command)
    }
}
