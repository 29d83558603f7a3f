//! Filename tokenizer
//!
//! Turns the raw series part of a filename (`Show.Name_`) into a search
//! string (`Show Name`) by collapsing the configured word separators.

use crate::config::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// A dash standing alone at the end, as in `Show Name - `
static TRAILING_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)-+\s*$").unwrap());

/// Collapses configured word separators into single spaces
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separators: Option<Regex>,
}

impl Tokenizer {
    /// Builds a tokenizer from word separator regexes such as `\s`, `\.`
    /// and `_`.
    pub fn new(word_separators: &[String]) -> Result<Self, ConfigError> {
        let alternatives: Vec<String> = word_separators
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| format!("(?:{s})"))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { separators: None });
        }

        let separators = Regex::new(&format!("(?:{})+", alternatives.join("|"))).map_err(
            |e| ConfigError::InvalidPattern {
                field: "word_separators",
                source: e,
            },
        )?;

        Ok(Self {
            separators: Some(separators),
        })
    }

    /// Derives a clean search string from the raw series fragment
    ///
    /// Runs of separators become a single space, a trailing ` - ` style
    /// delimiter is dropped and the result is trimmed. A dash attached to the
    /// last word is part of the name and stays.
    pub fn clean(&self, fragment: &str) -> String {
        let collapsed = match &self.separators {
            Some(separators) => separators.replace_all(fragment, " ").into_owned(),
            None => fragment.to_string(),
        };

        TRAILING_DELIMITER
            .replace(&collapsed, "")
            .trim()
            .to_string()
    }
}

/// Returns the substring after the last `.` of `filename`, if any
pub fn extension(filename: &str) -> Option<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
