//! Series resolution
//!
//! Looks up the series fragment of a filename with the metadata provider and
//! accepts the first result only if it names the same series.

use crate::metadata_retrieval::{MetadataProvider, MetadataRetrievalError};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Parenthesised suffixes and everything that is not a letter or digit
static NAME_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|[^\p{L}\p{N}]").unwrap());

/// Errors that can occur while resolving a series
#[derive(Debug, Error)]
pub enum ResolveError {
    /// There was no series name in front of the episode marker
    #[error("No series name found in filename")]
    EmptyFragment,

    /// The provider returned no results
    #[error("No series found for '{0}'")]
    NotFound(String),

    /// The first result names a different series
    #[error("Series '{candidate}' resolved to a different series '{resolved}'")]
    DifferentSeries { candidate: String, resolved: String },

    /// The lookup itself failed
    #[error("Series lookup failed: {0}")]
    Lookup(#[from] MetadataRetrievalError),
}

/// A series confirmed to match a filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMatch {
    /// Provider specific series identifier
    pub series_id: String,
    /// The series name as known to the provider
    pub canonical_name: String,
}

/// Resolves cleaned series fragments to provider series
pub struct SeriesResolver<'a, P: MetadataProvider> {
    provider: &'a P,
    language: &'a str,
}

impl<'a, P: MetadataProvider> SeriesResolver<'a, P> {
    pub fn new(provider: &'a P, language: &'a str) -> Self {
        Self { provider, language }
    }

    /// Resolves `fragment`, the cleaned series name taken from a filename.
    pub fn resolve(&self, fragment: &str) -> Result<SeriesMatch, ResolveError> {
        if fragment.trim().is_empty() {
            return Err(ResolveError::EmptyFragment);
        }

        let results = self.provider.search_series(fragment, self.language)?;
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NotFound(fragment.to_string()))?;

        tracing::debug!("'{}' resolved to '{}' ({})", fragment, first.name, first.id);

        if !is_same_series(fragment, &first.name) {
            return Err(ResolveError::DifferentSeries {
                candidate: fragment.to_string(),
                resolved: first.name,
            });
        }

        Ok(SeriesMatch {
            series_id: first.id,
            canonical_name: first.name,
        })
    }
}

/// Compares two series names ignoring case, parenthesised suffixes such as
/// `(2010)` and everything that is not a letter or digit.
pub fn is_same_series(name: &str, other: &str) -> bool {
    normalize(name) == normalize(other)
}

fn normalize(name: &str) -> String {
    NAME_NOISE.replace_all(name, "").to_lowercase()
}
