//! `${NAME}` variable expansion for action content.
//!
//! Identifiers may contain ASCII letters, digits, `_`, `-`, `@` and `:`.
//! Expansion fails on the first identifier that has no value; nothing is
//! returned in that case, so callers never see partially expanded content.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::bytes::{Captures, Regex};

use crate::error::{Error, Result};

static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_@:\-]+)\}").expect("variable pattern is a valid regex")
});

/// Expand every `${NAME}` in `content` using `variables`.
///
/// Content without placeholders is returned borrowed. `context` describes the
/// content being expanded ("search text", "file templates/ci.yml", ...) and is
/// carried in the `UnknownVariable` error.
pub fn expand<'a>(
    content: &'a [u8],
    variables: &HashMap<String, String>,
    context: &str,
) -> Result<Cow<'a, [u8]>> {
    // Resolve in a first pass so a miss fails before any output is built.
    for caps in VARIABLE_PATTERN.captures_iter(content) {
        let name = identifier(&caps);
        if !variables.contains_key(name) {
            return Err(Error::UnknownVariable {
                name: name.to_string(),
                context: context.to_string(),
            });
        }
    }

    Ok(VARIABLE_PATTERN.replace_all(content, |caps: &Captures<'_>| {
        variables
            .get(identifier(caps))
            .map(|v| v.as_bytes().to_vec())
            .unwrap_or_default()
    }))
}

/// Convenience wrapper around [`expand`] for text.
pub fn expand_str(
    content: &str,
    variables: &HashMap<String, String>,
    context: &str,
) -> Result<String> {
    let expanded = expand(content.as_bytes(), variables, context)?;
    Ok(String::from_utf8_lossy(&expanded).into_owned())
}

/// Names of every placeholder in `content`, in order of appearance.
pub fn placeholders(content: &[u8]) -> Vec<String> {
    VARIABLE_PATTERN
        .captures_iter(content)
        .map(|caps| identifier(&caps).to_string())
        .collect()
}

fn identifier<'c>(caps: &'c Captures<'_>) -> &'c str {
    // The identifier class is ASCII only, so this never fails.
    std::str::from_utf8(&caps[1]).unwrap_or_default()
}
