//! Final filename cleanup
//!
//! Titles may arrive HTML-escaped and may contain characters that are not
//! allowed in filenames. The sanitizer unescapes the common entities, applies
//! the configured replacement pairs and then removes reserved characters.

use crate::config::{ConfigError, PatternConfig};
use regex::{NoExpand, Regex};

/// Entities unescaped before any other rule, in this order
const HTML_ENTITIES: [(&str, &str); 5] = [
    ("&quot;", "\""),
    ("&amp;", "&"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
];

/// Compiled replacement and removal rules
#[derive(Debug, Clone)]
pub struct Sanitizer {
    replacements: Vec<(Regex, String)>,
    reserved: Vec<Regex>,
}

impl Sanitizer {
    pub fn new(config: &PatternConfig) -> Result<Self, ConfigError> {
        let replacements = config
            .replace_characters
            .iter()
            .map(|(pattern, replacement)| {
                Regex::new(pattern)
                    .map(|regex| (regex, replacement.clone()))
                    .map_err(|source| ConfigError::InvalidPattern {
                        field: "replace_characters",
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let reserved = config
            .reserved_characters
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    field: "reserved_characters",
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            replacements,
            reserved,
        })
    }

    /// Cleans a complete filename, extension included
    pub fn sanitize(&self, name: &str) -> String {
        let mut result = unescape_html(name);

        for (regex, replacement) in &self.replacements {
            result = regex
                .replace_all(&result, NoExpand(replacement))
                .into_owned();
        }

        for regex in &self.reserved {
            result = regex.replace_all(&result, "").into_owned();
        }

        result
    }
}

/// Replaces the few HTML entities metadata providers are known to emit
pub fn unescape_html(text: &str) -> String {
    HTML_ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, plain)| acc.replace(entity, plain))
}
