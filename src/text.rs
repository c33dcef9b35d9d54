//! Small text helpers shared by the extractors and the model callers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::THINK_STRIPPER;

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => text.get(..index).unwrap_or(text),
        None => text,
    }
}

/// Joins non-empty trimmed blocks with single spaces.
pub fn join_blocks<I, S>(blocks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    blocks
        .into_iter()
        .filter_map(|block| {
            let block = block.as_ref().trim();
            (!block.is_empty()).then(|| block.to_owned())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses every whitespace run into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_owned()
}

/// Removes `<think>` sections reasoning models prepend to their answers.
pub fn strip_thinking(response: &str) -> String {
    THINK_STRIPPER_REGEX
        .replace_all(response, "")
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_multibyte_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn join_skips_blank_blocks() {
        assert_eq!(join_blocks(["  a ", "", "\n", "b"]), "a b");
    }
}
