//! Regex based aliases for series names
//!
//! Aliases are `regex=replacement` lines read from a text file. Pre-execution
//! aliases rewrite the filename before the series is looked up, so that a
//! file named `Human.Target.S01E01.avi` can be resolved as
//! `Human Target (2010)`. Post-execution aliases rewrite the resolved series
//! name before it is written into the new filename.

use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading an alias file
#[derive(Debug, Error)]
pub enum AliasError {
    /// Failed to read the alias file
    #[error("Failed to read alias file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A line has no `=` separating pattern and replacement
    #[error("Alias file {path}, line {line}: expected `regex=replacement`")]
    MalformedLine { path: PathBuf, line: usize },

    /// The pattern of a line does not compile
    #[error("Alias file {path}, line {line}: {source}")]
    InvalidPattern {
        path: PathBuf,
        line: usize,
        source: regex::Error,
    },
}

/// A single alias rule
#[derive(Debug, Clone)]
struct AliasRule {
    pattern: Regex,
    replacement: String,
}

/// An ordered list of alias rules
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    rules: Vec<AliasRule>,
}

impl AliasTable {
    /// Loads an alias table from `path`.
    ///
    /// A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| AliasError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parses alias lines; `origin` is only used for error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, AliasError> {
        let mut rules = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (pattern, replacement) =
                line.split_once('=')
                    .ok_or_else(|| AliasError::MalformedLine {
                        path: origin.to_path_buf(),
                        line: line_number,
                    })?;

            let pattern = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| AliasError::InvalidPattern {
                    path: origin.to_path_buf(),
                    line: line_number,
                    source: e,
                })?;

            rules.push(AliasRule {
                pattern,
                replacement: replacement.to_string(),
            });
        }

        Ok(Self { rules })
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrites `text` with the first rule that matches it.
    ///
    /// Only the first occurrence is replaced and the replacement is inserted
    /// literally. Text that no rule matches is returned unchanged.
    pub fn rewrite(&self, text: &str) -> String {
        for rule in &self.rules {
            if rule.pattern.is_match(text) {
                let rewritten = rule
                    .pattern
                    .replacen(text, 1, regex::NoExpand(&rule.replacement));
                tracing::debug!("Alias '{}' rewrote '{}' to '{}'", rule.pattern, text, rewritten);
                return rewritten.into_owned();
            }
        }
        text.to_string()
    }
}

/// The pre- and post-resolution alias tables of a run
#[derive(Debug, Clone, Default)]
pub struct Aliases {
    /// Applied to the filename before parsing and lookup
    pub pre: AliasTable,
    /// Applied to the resolved series name
    pub post: AliasTable,
}

impl Aliases {
    /// Loads both alias files from the configuration directory
    pub fn load(config_dir: &Path) -> Result<Self, AliasError> {
        Ok(Self {
            pre: AliasTable::load(&config_dir.join(crate::config::PRE_EXEC_ALIAS_FILE))?,
            post: AliasTable::load(&config_dir.join(crate::config::POST_EXEC_ALIAS_FILE))?,
        })
    }
}
