//! SeriesRenamer - Rename TV episode files after their series and episode titles
//!
//! This library reads season and episode markers from filenames, looks the
//! series and episode titles up with a metadata provider and renames each
//! file according to an output template.

mod alias;
mod cache;
mod config;
mod episode_numbers;
mod episode_source;
mod file_operations;
mod file_resolver;
mod metadata_retrieval;
mod multipart;
mod pipeline;
mod sanitizer;
mod series_resolver;
mod template;
mod tokenizer;

// Re-export error types
pub use alias::AliasError;
pub use cache::CacheError;
pub use config::ConfigError;
pub use episode_numbers::ExtractError;
pub use episode_source::TitleError;
pub use file_operations::FileOperationError;
pub use file_resolver::FileResolverError;
pub use metadata_retrieval::MetadataRetrievalError;
pub use series_resolver::ResolveError;

pub use alias::{AliasTable, Aliases};
pub use config::{
    BatchMode, DEFAULT_FORMAT, NumberingScheme, PatternConfig, RenameOptions, default_config_dir,
};
pub use episode_numbers::{
    AnchorHeuristic, EpisodeNumberExtractor, NoHeuristic, NumberMatch, ParsedFilename,
    YearLikeDigits,
};
pub use episode_source::{BatchCache, EpisodeSource};
pub use file_operations::{RenameOutcome, RenameProposal, execute_rename};
pub use file_resolver::{EpisodeFile, scan_for_episodes};
pub use metadata_retrieval::{
    CachedMetadataProvider, EpisodeRecord, MetadataProvider, SeriesSummary, TvMazeProvider,
};
pub use multipart::{MergedTitles, merge_titles};
pub use pipeline::{RunSummary, SeriesRenamer, SkipReason};
pub use sanitizer::Sanitizer;
pub use series_resolver::{SeriesMatch, SeriesResolver, is_same_series};
pub use template::{RenderContext, RenderIssue, Rendered, Template, render};
pub use tokenizer::Tokenizer;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Progress event emitted during a run
///
/// These events allow library users to report what happens to each file.
#[derive(Debug)]
pub enum ProgressEvent {
    /// Run started
    Started {
        target: PathBuf,
        simulate: bool,
        scheme: NumberingScheme,
    },

    /// Candidate files found
    FilesFound { count: usize },

    /// Processing a specific file
    ProcessingFile {
        index: usize,
        total: usize,
        path: PathBuf,
    },

    /// Episode records prefetched for batch mode
    BatchFetched {
        series_id: String,
        season: Option<u32>,
        episode_count: usize,
    },

    /// File renamed
    Renamed { from: PathBuf, to: PathBuf },

    /// File would have been renamed
    Simulated { from: PathBuf, to: PathBuf },

    /// File already carries its proposed name
    AlreadyNamed { path: PathBuf },

    /// File left untouched
    Skipped { path: PathBuf, reason: SkipReason },

    /// Run complete
    Complete { summary: RunSummary },
}

/// Top-level error type for SeriesRenamer operations
#[derive(Debug, Error)]
pub enum SeriesRenamerError {
    /// Error loading or compiling the pattern configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error loading an alias file
    #[error("Alias error: {0}")]
    Alias(#[from] AliasError),

    /// Error during file resolution
    #[error("File resolution error: {0}")]
    FileResolver(#[from] FileResolverError),

    /// Error opening the metadata cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The output template contains no placeholder
    #[error("Invalid format template '{0}': no placeholders")]
    InvalidTemplate(String),
}

/// Renames the episode files at `target`
///
/// Loads the pattern configuration and alias files from `config_dir`, looks
/// up series and episodes on TVMaze and renames every file it can resolve.
/// Responses are cached on disk for a day unless `use_cache` is false.
///
/// Progress events are emitted through the provided callback, allowing library
/// users to track progress, display status, or remain silent.
///
/// # Arguments
///
/// * `target` - A file or a directory of episode files
/// * `config_dir` - Directory holding the configuration and alias files
/// * `options` - Format template, numbering scheme and run flags
/// * `use_cache` - Whether metadata responses are cached on disk
/// * `progress_callback` - Closure called with progress events
///
/// # Returns
///
/// Counts of renamed, already named and skipped files
///
/// # Examples
///
/// ```no_run
/// use series_renamer::{rename_episodes, ProgressEvent, RenameOptions};
/// use std::path::Path;
///
/// let summary = rename_episodes(
///     Path::new("/path/to/episodes"),
///     Path::new("/path/to/config"),
///     RenameOptions { simulate: true, ..RenameOptions::default() },
///     true,
///     |event| {
///         if let ProgressEvent::Simulated { from, to } = event {
///             println!("{} -> {}", from.display(), to.display());
///         }
///     },
/// ).unwrap();
///
/// assert!(summary.success());
/// ```
pub fn rename_episodes<F>(
    target: &Path,
    config_dir: &Path,
    options: RenameOptions,
    use_cache: bool,
    progress_callback: F,
) -> Result<RunSummary, SeriesRenamerError>
where
    F: FnMut(ProgressEvent),
{
    let config = PatternConfig::load_or_init(config_dir)?;
    let aliases = Aliases::load(config_dir)?;
    tracing::debug!(
        "Loaded {} pre and {} post aliases",
        aliases.pre.len(),
        aliases.post.len()
    );

    let provider = TvMazeProvider::new();
    if use_cache {
        let provider = CachedMetadataProvider::new(provider)?;
        SeriesRenamer::new(provider, config, aliases, options)?.rename_all(target, progress_callback)
    } else {
        SeriesRenamer::new(provider, config, aliases, options)?.rename_all(target, progress_callback)
    }
}
