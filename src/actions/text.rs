//! Text actions: regex edits inside one file.
//!
//! Line operations split the file on `\n` and test each line on its own; a
//! line is selected when the pattern matches anywhere in it, and the whole
//! line is then replaced or dropped. Text operations run the pattern over the
//! whole file in multi-line mode, so `^` and `$` match at line boundaries.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use regex::bytes::{Captures, Regex};

use super::{missing, unsupported, ActionConfig, Arguments};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::variables;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOp {
    ReplaceLine { apply: String },
    DeleteLine,
    ReplaceText { apply: String },
    AppendText { apply: String },
    DeleteText,
}

impl TextOp {
    pub fn type_name(&self) -> &'static str {
        match self {
            TextOp::ReplaceLine { .. } => "replaceLine",
            TextOp::DeleteLine => "deleteLine",
            TextOp::ReplaceText { .. } => "replaceText",
            TextOp::AppendText { .. } => "appendText",
            TextOp::DeleteText => "deleteText",
        }
    }

    fn is_line_op(&self) -> bool {
        matches!(self, TextOp::ReplaceLine { .. } | TextOp::DeleteLine)
    }

    pub(super) fn apply_text(&self) -> Option<&str> {
        match self {
            TextOp::ReplaceLine { apply }
            | TextOp::ReplaceText { apply }
            | TextOp::AppendText { apply } => Some(apply),
            TextOp::DeleteLine | TextOp::DeleteText => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAction {
    op: TextOp,
    search_text: String,
    path: String,
}

pub(super) fn parse(config: &ActionConfig) -> Result<TextAction> {
    if config.path.is_empty() {
        return Err(missing("path", "text"));
    }
    if config.search_text.is_empty() {
        return Err(missing("search text", "text"));
    }

    let apply = || -> Result<String> {
        if config.apply_text.is_empty() {
            return Err(missing("apply text", "text"));
        }
        Ok(config.apply_text.clone())
    };
    let op = match config.r#type.as_str() {
        "replaceLine" => TextOp::ReplaceLine { apply: apply()? },
        "deleteLine" => TextOp::DeleteLine,
        "replaceText" => TextOp::ReplaceText { apply: apply()? },
        "appendText" => TextOp::AppendText { apply: apply()? },
        "deleteText" => TextOp::DeleteText,
        other => return Err(unsupported(other)),
    };

    Ok(TextAction {
        op,
        search_text: config.search_text.clone(),
        path: config.path.clone(),
    })
}

impl TextAction {
    pub fn op(&self) -> &TextOp {
        &self.op
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(super) fn run(
        &self,
        token: &CancellationToken,
        root: &Path,
        args: &Arguments,
    ) -> Result<String> {
        let search = variables::expand_str(&self.search_text, &args.variables, "search text")?;
        let apply: Cow<'_, [u8]> = match self.op.apply_text() {
            Some(text) => variables::expand(text.as_bytes(), &args.variables, "apply text")?,
            None => Cow::Borrowed(&[]),
        };

        let pattern = if self.op.is_line_op() {
            search.clone()
        } else {
            format!("(?m){search}")
        };
        let regex = Regex::new(&pattern).map_err(|source| Error::Compile {
            pattern: search.clone(),
            source,
        })?;

        let file = root.join(&self.path);
        token.check()?;
        let data = fs::read(&file)
            .map_err(|e| Error::io(format!("failed to read file {}", file.display()), e))?;

        let output = transform(&self.op, &regex, &data, &apply);

        token.check()?;
        fs::write(&file, output)
            .map_err(|e| Error::io(format!("failed to write file {}", file.display()), e))?;

        Ok(self.message(&search, &String::from_utf8_lossy(&apply)))
    }

    fn message(&self, search: &str, apply: &str) -> String {
        let path = &self.path;
        match self.op {
            TextOp::ReplaceLine { .. } => {
                format!("Replaced line `{search}` with `{apply}` in `{path}`")
            }
            TextOp::DeleteLine => format!("Deleted line `{search}` in `{path}`"),
            TextOp::ReplaceText { .. } => {
                format!("Replaced text `{search}` with `{apply}` in `{path}`")
            }
            TextOp::AppendText { .. } => {
                format!("Appended text `{apply}` to all occurrences of `{search}` in `{path}`")
            }
            TextOp::DeleteText => format!("Deleted all occurrences of `{search}` in `{path}`"),
        }
    }
}

/// Apply `op` to `data`. `apply` is already expanded.
fn transform(op: &TextOp, regex: &Regex, data: &[u8], apply: &[u8]) -> Vec<u8> {
    match op {
        TextOp::ReplaceLine { .. } => data
            .split(|b| *b == b'\n')
            .map(|line| if regex.is_match(line) { apply } else { line })
            .collect::<Vec<_>>()
            .join(&b'\n'),
        TextOp::DeleteLine => data
            .split(|b| *b == b'\n')
            .filter(|line| !regex.is_match(line))
            .collect::<Vec<_>>()
            .join(&b'\n'),
        // `$1` in the apply text refers to a capture group.
        TextOp::ReplaceText { .. } => regex.replace_all(data, apply).into_owned(),
        TextOp::AppendText { .. } => regex
            .replace_all(data, |caps: &Captures<'_>| {
                let mut out = caps[0].to_vec();
                out.extend_from_slice(apply);
                out
            })
            .into_owned(),
        TextOp::DeleteText => regex.split(data).flatten().copied().collect(),
    }
}

impl fmt::Display for TextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (search, path) = (&self.search_text, &self.path);
        match &self.op {
            TextOp::ReplaceLine { apply } => {
                write!(f, "replace line: {search:?}\n  with: {apply:?}\n  path: {path:?}")
            }
            TextOp::DeleteLine => write!(f, "delete line: {search:?}\n  path: {path:?}"),
            TextOp::ReplaceText { apply } => {
                write!(f, "replace text: {search:?}\n  with: {apply:?}\n  path: {path:?}")
            }
            TextOp::AppendText { apply } => {
                write!(f, "append text: {apply:?}\n  to: {search:?}\n  path: {path:?}")
            }
            TextOp::DeleteText => write!(f, "delete text: {search:?}\n  path: {path:?}"),
        }
    }
}
