//! # Error Suggestions
//!
//! Helper functions for generating error messages with hints. Errors should
//! tell users what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cannon::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

/// Every action type the parser accepts.
pub const ACTION_TYPES: [&str; 11] = [
    "replaceLine",
    "deleteLine",
    "replaceText",
    "appendText",
    "deleteText",
    "createFile",
    "replaceFile",
    "createOrReplaceFile",
    "deleteFile",
    "runCommand",
    "shellCommand",
];

/// Generate an error for when the configuration file is not found.
///
/// Includes hints about:
/// - Creating a new config file
/// - Using the -p/--path flag
/// - Using the CANNON_CONFIG environment variable
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a cannon.yml file listing `repos` and `actions`\n\
         hint: Use -p/--path to specify a different path\n\
         hint: Set CANNON_CONFIG environment variable",
        path = path.display()
    )
}

/// Build the hint attached to an unsupported action type.
///
/// Suggests the closest known type when one is within a couple of edits,
/// otherwise lists every valid type.
pub fn action_type_hint(action_type: &str) -> String {
    match find_similar(action_type, &ACTION_TYPES) {
        Some(s) => format!("Did you mean '{s}'?"),
        None => format!("Valid action types are: {}", ACTION_TYPES.join(", ")),
    }
}

/// Hint for a repository name that is not `owner/name`.
pub fn repo_name_hint(name: &str) -> String {
    match name.split_once('/') {
        None => format!("Use the GitHub form owner/name, e.g. 'my-org/{name}'"),
        Some(_) => "Use exactly one '/' between the owner and the repository name".to_string(),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows are enough.
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}
