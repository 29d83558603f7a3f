//! Configuration module
//!
//! Holds the pattern configuration (season/episode regex fragments, valid
//! extensions, reserved characters, replacement pairs and word separators)
//! that is persisted as TOML in the application's configuration directory,
//! and the per-run options chosen on the command line.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the pattern configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "series-renamer.toml";

/// Name of the alias file applied to the filename before resolution
pub const PRE_EXEC_ALIAS_FILE: &str = "pre_exec_aliases.txt";

/// Name of the alias file applied to the resolved series name
pub const POST_EXEC_ALIAS_FILE: &str = "post_exec_aliases.txt";

/// Format used when none is given on the command line
pub const DEFAULT_FORMAT: &str = "<SeriesName> - <SeasonNumber>x<EpisodeNumber>[-<MultipartEpNum>][ - <EpisodeTitle>][-<MultipartEpTitle>]";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine the configuration directory location
    #[error("Failed to determine configuration directory location")]
    ConfigDirectoryNotFound,

    /// Failed to create the configuration directory
    #[error("Failed to create configuration directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read the configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the default configuration file
    #[error("Failed to write configuration file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("Failed to parse configuration file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize the default configuration
    #[error("Failed to serialize configuration: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    /// A configured regex fragment does not compile
    #[error("Invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        source: regex::Error,
    },
}

/// Regex fragments and character rules that drive filename parsing and
/// sanitizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Regex fragment matching the season part of `S01E02` / `1x02`
    pub season: String,
    /// Regex fragment matching the episode part of `S01E02` / `1x02`
    pub episode: String,
    /// Extensions of files that are considered for renaming
    pub valid_extensions: Vec<String>,
    /// Regexes whose matches are removed from the final name
    pub reserved_characters: Vec<String>,
    /// Ordered `(regex, replacement)` pairs applied to the final name
    pub replace_characters: Vec<(String, String)>,
    /// Regexes matching characters that separate words in a filename
    pub word_separators: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            season: "(?i)s?[0-9]{1,2}?".to_string(),
            episode: "(?i)[ex]?[0-9]{2}".to_string(),
            valid_extensions: ["avi", "mkv", "mp4", "mpg", "srt", "idx", "sub"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reserved_characters: ["/", r"\\", r"\?", "%", r"\*", ":", r"\|", "\"", "<", ">"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            replace_characters: vec![
                ("/".to_string(), "-".to_string()),
                (r"\\".to_string(), "-".to_string()),
            ],
            word_separators: [r"\s", r"\.", "_"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PatternConfig {
    /// Loads the pattern configuration from `dir`, writing the defaults first
    /// if no configuration file exists yet.
    pub fn load_or_init(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

            let defaults = Self::default();
            let content = toml::to_string_pretty(&defaults)?;
            fs::write(&path, content).map_err(|e| ConfigError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(defaults);
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed { path, source: e })
    }

    /// Returns true if `extension` is one of the configured valid extensions
    pub fn is_valid_extension(&self, extension: &str) -> bool {
        self.valid_extensions
            .iter()
            .any(|valid| valid.trim().eq_ignore_ascii_case(extension))
    }
}

/// Returns the platform configuration directory for the application
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("org", "seriesrenamer", "series-renamer")
        .ok_or(ConfigError::ConfigDirectoryNotFound)?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Episode numbering convention governing extraction and title lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NumberingScheme {
    /// Aired order, `S01E02` style markers
    #[default]
    Default,
    /// DVD order, same markers but looked up against DVD numbering
    Dvd,
    /// Absolute episode numbers without a season
    Absolute,
}

/// Prefetch strategy for episode records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// One lookup per episode
    #[default]
    None,
    /// Fetch every episode of the series once
    FullSeries,
    /// Fetch every episode of the first file's season once
    FullSeason,
}

/// Options chosen for a single run
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Output template, see [`crate::template`]
    pub format: String,
    /// Numbering scheme used for extraction and lookup
    pub scheme: NumberingScheme,
    /// Whether episode records are prefetched
    pub batch_mode: BatchMode,
    /// Only report what would be renamed
    pub simulate: bool,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Language passed to the metadata provider
    pub language: String,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            scheme: NumberingScheme::Default,
            batch_mode: BatchMode::None,
            simulate: false,
            recursive: false,
            language: "en".to_string(),
        }
    }
}
