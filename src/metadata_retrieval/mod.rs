/// Data structures and traits for TV series metadata retrieval.
///
/// This module provides structures to represent series search results and
/// episode records as delivered by an online series database, as well as the
/// trait that metadata providers implement.
mod cached;
mod tvmaze;
mod tvmaze_types;

pub use cached::CachedMetadataProvider;
pub use tvmaze::TvMazeProvider;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during metadata retrieval operations.
#[derive(Debug, Error)]
pub enum MetadataRetrievalError {
    /// Request to the metadata provider failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The requested series was not found
    #[error("Series not found: {0}")]
    SeriesNotFound(String),
}

/// A series as returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Provider specific series identifier
    pub id: String,
    /// The canonical series name
    pub name: String,
}

/// A single episode of a TV series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Identifier of the series this episode belongs to
    pub series_id: String,
    /// The season number in aired order
    pub season_number: u32,
    /// The episode number within the season in aired order
    pub episode_number: u32,
    /// The season in DVD order; empty if unknown, may be fractional
    pub dvd_season: String,
    /// The episode number in DVD order; empty if unknown, may be fractional
    pub dvd_episode_number: String,
    /// The episode title
    pub episode_name: String,
}

impl EpisodeRecord {
    /// Returns true if this is the given episode in aired order
    pub fn matches_aired(&self, season: u32, episode: u32) -> bool {
        self.season_number == season && self.episode_number == episode
    }

    /// Returns true if this is the given episode in DVD order
    ///
    /// DVD numbers such as `"1.5"` are truncated before comparing. Records
    /// without DVD numbers never match.
    pub fn matches_dvd(&self, season: u32, episode: u32) -> bool {
        match (
            parse_dvd_number(&self.dvd_season),
            parse_dvd_number(&self.dvd_episode_number),
        ) {
            (Some(dvd_season), Some(dvd_episode)) => dvd_season == season && dvd_episode == episode,
            _ => false,
        }
    }
}

/// Parses a possibly fractional DVD number, truncating towards zero
fn parse_dvd_number(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(number) = value.parse::<u32>() {
        return Some(number);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc() as u32)
}

/// Trait for metadata providers that can look up series and episodes.
///
/// Implementors of this trait can retrieve episode metadata from various sources
/// such as TVDB, TMDB, or other episode databases.
pub trait MetadataProvider {
    /// Searches for series matching `name`, best match first.
    fn search_series(
        &self,
        name: &str,
        language: &str,
    ) -> Result<Vec<SeriesSummary>, MetadataRetrievalError>;

    /// Looks up a single episode by its aired season and episode number.
    fn episode(
        &self,
        series_id: &str,
        season: u32,
        episode: u32,
        language: &str,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError>;

    /// Fetches every episode of a series.
    fn all_episodes(
        &self,
        series_id: &str,
        language: &str,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError>;

    /// Looks up a single episode by its DVD season and episode number.
    fn dvd_episode(
        &self,
        series_id: &str,
        season: u32,
        episode: u32,
        language: &str,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
        Ok(self
            .all_episodes(series_id, language)?
            .into_iter()
            .find(|record| record.matches_dvd(season, episode)))
    }

    /// Fetches every episode of one season of a series.
    fn season_episodes(
        &self,
        series_id: &str,
        season: u32,
        language: &str,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        Ok(self
            .all_episodes(series_id, language)?
            .into_iter()
            .filter(|record| record.season_number == season)
            .collect())
    }
}
