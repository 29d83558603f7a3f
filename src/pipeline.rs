//! Per-file rename pipeline
//!
//! For every file: pre-alias the name, extract the episode numbers, resolve
//! the series, look up the titles, merge multipart titles, post-alias the
//! series name, render the template and sanitize the result. The outcome is
//! a [`RenameProposal`] that [`execute_rename`] then checks and applies.

use crate::alias::Aliases;
use crate::config::{BatchMode, PatternConfig, RenameOptions};
use crate::episode_numbers::{AnchorHeuristic, EpisodeNumberExtractor, ExtractError};
use crate::episode_source::{BatchCache, EpisodeSource, TitleError};
use crate::file_operations::{FileOperationError, RenameOutcome, RenameProposal, execute_rename};
use crate::file_resolver::scan_for_episodes;
use crate::metadata_retrieval::MetadataProvider;
use crate::multipart::merge_titles;
use crate::sanitizer::Sanitizer;
use crate::series_resolver::{ResolveError, SeriesResolver};
use crate::template::{RenderContext, Template};
use crate::tokenizer::extension;
use crate::{ProgressEvent, SeriesRenamerError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a file was left untouched
#[derive(Debug, Error)]
pub enum SkipReason {
    /// No season/episode marker in the filename
    #[error(transparent)]
    Parse(#[from] ExtractError),

    /// The series could not be resolved or failed the identity check
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// No title for the episode; `cause` names the lookup failure if any
    #[error(
        "Episode title not found{}",
        .cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default()
    )]
    TitleNotFound { cause: Option<String> },

    #[error("Multipart episode title not found")]
    MultipartTitleNotFound,

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// The file name is not valid UTF-8 or the computed name is unusable
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error(transparent)]
    RenameFailed(FileOperationError),
}

impl From<FileOperationError> for SkipReason {
    fn from(error: FileOperationError) -> Self {
        match error {
            FileOperationError::TitleNotFound => SkipReason::TitleNotFound { cause: None },
            FileOperationError::MultipartTitleNotFound => SkipReason::MultipartTitleNotFound,
            FileOperationError::DestinationExists(path) => SkipReason::DestinationExists(path),
            other => SkipReason::RenameFailed(other),
        }
    }
}

/// Counts of a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files considered
    pub processed: usize,
    /// Files renamed, or that would have been renamed when simulating
    pub renamed: usize,
    /// Files that already carried their proposed name
    pub already_named: usize,
    /// Files skipped for any [`SkipReason`]
    pub skipped: usize,
}

impl RunSummary {
    /// A run succeeds if at least one file was renamed
    pub fn success(&self) -> bool {
        self.renamed > 0
    }
}

/// Renames episode files using a metadata provider
pub struct SeriesRenamer<P: MetadataProvider> {
    provider: P,
    config: PatternConfig,
    extractor: EpisodeNumberExtractor,
    sanitizer: Sanitizer,
    aliases: Aliases,
    template: Template,
    options: RenameOptions,
    batch: Option<BatchCache>,
}

impl<P: MetadataProvider> SeriesRenamer<P> {
    /// Compiles the configured patterns and parses the output template
    pub fn new(
        provider: P,
        config: PatternConfig,
        aliases: Aliases,
        options: RenameOptions,
    ) -> Result<Self, SeriesRenamerError> {
        let template = Template::parse(&options.format);
        if template.placeholders().is_empty() {
            return Err(SeriesRenamerError::InvalidTemplate(options.format));
        }

        Ok(Self {
            extractor: EpisodeNumberExtractor::new(&config)?,
            sanitizer: Sanitizer::new(&config)?,
            provider,
            config,
            aliases,
            template,
            options,
            batch: None,
        })
    }

    /// Replaces the heuristic used to skip year-like digits in titles
    pub fn with_heuristic<H>(mut self, heuristic: H) -> Self
    where
        H: AnchorHeuristic + 'static,
    {
        self.extractor = self.extractor.with_heuristic(heuristic);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Computes the new name for a single file without touching it
    pub fn propose(&mut self, path: &Path) -> Result<RenameProposal, SkipReason> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SkipReason::InvalidFileName(path.display().to_string()))?;

        let aliased = self.aliases.pre.rewrite(file_name);
        let scheme = self.options.scheme;
        let parsed = self.extractor.extract(&aliased, scheme)?;

        let series = SeriesResolver::new(&self.provider, &self.options.language)
            .resolve(&parsed.cleaned_series_fragment)?;

        if self.options.batch_mode != BatchMode::None && self.batch.is_none() {
            let season = match self.options.batch_mode {
                BatchMode::FullSeason => parsed.season_number,
                _ => None,
            };
            match BatchCache::fetch(
                &self.provider,
                &series.series_id,
                season,
                &self.options.language,
            ) {
                Ok(batch) => {
                    tracing::debug!(
                        "Fetched {} episodes of series {}",
                        batch.len(),
                        series.series_id
                    );
                    self.batch = Some(batch);
                }
                Err(e) => tracing::warn!("Failed to fetch episode list, looking up singly: {}", e),
            }
        }

        let source = match &self.batch {
            Some(batch) => EpisodeSource::CachedBatch(batch),
            None => EpisodeSource::LiveLookup {
                provider: &self.provider,
                language: &self.options.language,
            },
        };

        let lookup = |episode: u32| {
            source
                .find_title(&series.series_id, parsed.season_number, episode, scheme)
                .inspect_err(|e| log_title_error(file_name, e))
        };

        let (title, title_error) = match lookup(parsed.episode_number) {
            Ok(title) => (Some(title), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let multipart_title = parsed
            .multipart_episode_number
            .and_then(|episode| lookup(episode).ok());

        let titles = merge_titles(title.as_deref().unwrap_or_default(), multipart_title.as_deref());
        let series_name = self.aliases.post.rewrite(&series.canonical_name);

        let context = RenderContext::for_episode(
            &series_name,
            parsed.season_number,
            parsed.episode_number,
            parsed.multipart_episode_number,
            &titles,
        );
        let rendered = self.template.render(&context).text;

        let new_name = match extension(file_name) {
            Some(ext) => format!("{rendered}.{ext}"),
            None => rendered,
        };
        let new_name = self.sanitizer.sanitize(&new_name);
        if new_name.trim().is_empty() || new_name.starts_with('.') {
            return Err(SkipReason::InvalidFileName(new_name));
        }

        let mut proposal = RenameProposal::new(path, new_name);
        proposal.title_found = title.is_some();
        proposal.title_error = title_error;
        proposal.multipart_present = parsed.multipart_episode_number.is_some();
        proposal.multipart_title_found = multipart_title.is_some();
        Ok(proposal)
    }

    /// Renames every episode file found at `target`
    ///
    /// Files are collected before the first rename. Failures of single files
    /// are reported through `progress_callback` and do not stop the run.
    pub fn rename_all<F>(
        &mut self,
        target: &Path,
        mut progress_callback: F,
    ) -> Result<RunSummary, SeriesRenamerError>
    where
        F: FnMut(ProgressEvent),
    {
        progress_callback(ProgressEvent::Started {
            target: target.to_path_buf(),
            simulate: self.options.simulate,
            scheme: self.options.scheme,
        });

        let config = &self.config;
        let files = scan_for_episodes(target, self.options.recursive, |ext| {
            config.is_valid_extension(ext)
        })?;
        progress_callback(ProgressEvent::FilesFound { count: files.len() });

        let simulate = self.options.simulate;
        let mut summary = RunSummary::default();

        for (index, file) in files.iter().enumerate() {
            progress_callback(ProgressEvent::ProcessingFile {
                index,
                total: files.len(),
                path: file.path.clone(),
            });
            summary.processed += 1;

            let had_batch = self.batch.is_some();
            let result = self.propose(&file.path).and_then(|proposal| {
                match execute_rename(&proposal, simulate) {
                    Ok(outcome) => Ok((outcome, proposal)),
                    Err(FileOperationError::TitleNotFound) => Err(SkipReason::TitleNotFound {
                        cause: proposal.title_error,
                    }),
                    Err(e) => Err(e.into()),
                }
            });

            if let (false, Some(batch)) = (had_batch, &self.batch) {
                progress_callback(ProgressEvent::BatchFetched {
                    series_id: batch.series_id().to_string(),
                    season: batch.season(),
                    episode_count: batch.len(),
                });
            }

            match result {
                Ok((RenameOutcome::Renamed, proposal)) => {
                    summary.renamed += 1;
                    progress_callback(ProgressEvent::Renamed {
                        from: proposal.source,
                        to: proposal.destination,
                    });
                }
                Ok((RenameOutcome::Simulated, proposal)) => {
                    summary.renamed += 1;
                    progress_callback(ProgressEvent::Simulated {
                        from: proposal.source,
                        to: proposal.destination,
                    });
                }
                Ok((RenameOutcome::AlreadyNamed, proposal)) => {
                    summary.already_named += 1;
                    progress_callback(ProgressEvent::AlreadyNamed {
                        path: proposal.source,
                    });
                }
                Err(reason) => {
                    summary.skipped += 1;
                    progress_callback(ProgressEvent::Skipped {
                        path: file.path.clone(),
                        reason,
                    });
                }
            }
        }

        progress_callback(ProgressEvent::Complete { summary });
        Ok(summary)
    }
}

/// Missing episodes are expected; provider failures and inconsistencies are not
fn log_title_error(file_name: &str, error: &TitleError) {
    match error {
        TitleError::NotFound { .. } | TitleError::MissingSeason(_) => {
            tracing::debug!("{}: {}", file_name, error)
        }
        TitleError::SchemeUnsupported
        | TitleError::SeriesMismatch { .. }
        | TitleError::Lookup(_) => tracing::warn!("{}: {}", file_name, error),
    }
}
