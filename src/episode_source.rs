//! Episode title lookup
//!
//! Titles come either straight from the metadata provider, one request per
//! episode, or from a batch of episode records fetched once per run. Both are
//! exposed through [`EpisodeSource::find_title`].

use crate::config::NumberingScheme;
use crate::metadata_retrieval::{EpisodeRecord, MetadataProvider, MetadataRetrievalError};
use thiserror::Error;

/// Errors that can occur while looking up an episode title
#[derive(Debug, Error)]
pub enum TitleError {
    /// Titles cannot be looked up by absolute episode number
    #[error("Renaming according to the absolute numbering scheme is not supported")]
    SchemeUnsupported,

    /// The filename did not provide a season
    #[error("No season number available for episode {0}")]
    MissingSeason(u32),

    /// No episode with these numbers, or it has no title
    #[error("Episode {season}x{episode:02} not found")]
    NotFound { season: u32, episode: u32 },

    /// The batch holds episodes of another series
    #[error("Episode list belongs to series {found}, not {expected}")]
    SeriesMismatch { expected: String, found: String },

    /// The provider request failed
    #[error("Episode lookup failed: {0}")]
    Lookup(#[from] MetadataRetrievalError),
}

/// Episode records of one series, optionally limited to one season
#[derive(Debug, Clone)]
pub struct BatchCache {
    series_id: String,
    season: Option<u32>,
    episodes: Vec<EpisodeRecord>,
}

impl BatchCache {
    /// Fetches all episodes of a series, or of one season when `season` is
    /// given.
    pub fn fetch<P: MetadataProvider>(
        provider: &P,
        series_id: &str,
        season: Option<u32>,
        language: &str,
    ) -> Result<Self, MetadataRetrievalError> {
        let episodes = match season {
            Some(season) => provider.season_episodes(series_id, season, language)?,
            None => provider.all_episodes(series_id, language)?,
        };

        Ok(Self::new(series_id, season, episodes))
    }

    pub fn new(series_id: &str, season: Option<u32>, episodes: Vec<EpisodeRecord>) -> Self {
        Self {
            series_id: series_id.to_string(),
            season,
            episodes,
        }
    }

    /// The series the batch was fetched for
    pub fn series_id(&self) -> &str {
        &self.series_id
    }

    /// The season the batch was limited to, if any
    pub fn season(&self) -> Option<u32> {
        self.season
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    fn find_title(
        &self,
        series_id: &str,
        season: u32,
        episode: u32,
        scheme: NumberingScheme,
    ) -> Result<String, TitleError> {
        for record in &self.episodes {
            if record.series_id != series_id {
                return Err(TitleError::SeriesMismatch {
                    expected: series_id.to_string(),
                    found: record.series_id.clone(),
                });
            }

            let matches = match scheme {
                NumberingScheme::Default => record.matches_aired(season, episode),
                NumberingScheme::Dvd => record.matches_dvd(season, episode),
                NumberingScheme::Absolute => return Err(TitleError::SchemeUnsupported),
            };

            if matches {
                return title_of(Some(record), season, episode);
            }
        }

        Err(TitleError::NotFound { season, episode })
    }
}

/// Where episode titles are looked up
pub enum EpisodeSource<'a, P: MetadataProvider> {
    /// One provider request per episode
    LiveLookup { provider: &'a P, language: &'a str },
    /// A scan of prefetched records
    CachedBatch(&'a BatchCache),
}

impl<P: MetadataProvider> EpisodeSource<'_, P> {
    /// Finds the title of an episode under the given numbering scheme
    pub fn find_title(
        &self,
        series_id: &str,
        season: Option<u32>,
        episode: u32,
        scheme: NumberingScheme,
    ) -> Result<String, TitleError> {
        if scheme == NumberingScheme::Absolute {
            return Err(TitleError::SchemeUnsupported);
        }
        let season = season.ok_or(TitleError::MissingSeason(episode))?;

        match self {
            EpisodeSource::LiveLookup { provider, language } => {
                let record = match scheme {
                    NumberingScheme::Dvd => {
                        provider.dvd_episode(series_id, season, episode, language)?
                    }
                    _ => provider.episode(series_id, season, episode, language)?,
                };
                title_of(record.as_ref(), season, episode)
            }
            EpisodeSource::CachedBatch(batch) => {
                batch.find_title(series_id, season, episode, scheme)
            }
        }
    }
}

/// A record without a title counts as not found
fn title_of(record: Option<&EpisodeRecord>, season: u32, episode: u32) -> Result<String, TitleError> {
    record
        .map(|r| r.episode_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(TitleError::NotFound { season, episode })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata_retrieval::SeriesSummary;

    fn record(series_id: &str, season: u32, episode: u32, dvd: (&str, &str), name: &str) -> EpisodeRecord {
        EpisodeRecord {
            series_id: series_id.to_string(),
            season_number: season,
            episode_number: episode,
            dvd_season: dvd.0.to_string(),
            dvd_episode_number: dvd.1.to_string(),
            episode_name: name.to_string(),
        }
    }

    struct Catalog(Vec<EpisodeRecord>);

    impl MetadataProvider for Catalog {
        fn search_series(
            &self,
            _name: &str,
            _language: &str,
        ) -> Result<Vec<SeriesSummary>, MetadataRetrievalError> {
            Ok(Vec::new())
        }

        fn episode(
            &self,
            series_id: &str,
            season: u32,
            episode: u32,
            _language: &str,
        ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
            Ok(self
                .0
                .iter()
                .find(|r| r.series_id == series_id && r.matches_aired(season, episode))
                .cloned())
        }

        fn all_episodes(
            &self,
            series_id: &str,
            _language: &str,
        ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
            if series_id == "broken" {
                return Err(MetadataRetrievalError::RequestError("offline".to_string()));
            }
            Ok(self
                .0
                .iter()
                .filter(|r| r.series_id == series_id)
                .cloned()
                .collect())
        }
    }

    fn catalog() -> Catalog {
        Catalog(vec![
            record("1", 1, 1, ("1", "1"), "Pilot"),
            record("1", 1, 2, ("1", "3.5"), "Second"),
            record("1", 1, 3, ("", ""), ""),
            record("1", 2, 1, ("2", "1"), "Return"),
        ])
    }

    #[test]
    fn test_live_lookup() {
        let provider = catalog();
        let source = EpisodeSource::LiveLookup {
            provider: &provider,
            language: "en",
        };

        assert_eq!(
            source
                .find_title("1", Some(1), 2, NumberingScheme::Default)
                .unwrap(),
            "Second"
        );
        assert_eq!(
            source.find_title("1", Some(1), 3, NumberingScheme::Dvd).unwrap(),
            "Second"
        );
        assert!(matches!(
            source.find_title("1", Some(9), 9, NumberingScheme::Default),
            Err(TitleError::NotFound { season: 9, episode: 9 })
        ));
    }

    #[test]
    fn test_empty_title_is_not_found() {
        let provider = catalog();
        let source = EpisodeSource::LiveLookup {
            provider: &provider,
            language: "en",
        };
        assert!(matches!(
            source.find_title("1", Some(1), 3, NumberingScheme::Default),
            Err(TitleError::NotFound { .. })
        ));
    }

    #[test]
    fn test_absolute_is_unsupported() {
        let provider = catalog();
        let live = EpisodeSource::LiveLookup {
            provider: &provider,
            language: "en",
        };
        assert!(matches!(
            live.find_title("1", None, 1, NumberingScheme::Absolute),
            Err(TitleError::SchemeUnsupported)
        ));

        let batch = BatchCache::fetch(&provider, "1", None, "en").unwrap();
        let cached: EpisodeSource<'_, Catalog> = EpisodeSource::CachedBatch(&batch);
        assert!(matches!(
            cached.find_title("1", Some(1), 1, NumberingScheme::Absolute),
            Err(TitleError::SchemeUnsupported)
        ));
    }

    #[test]
    fn test_batch_lookup_matches_live_lookup() {
        let provider = catalog();
        let batch = BatchCache::fetch(&provider, "1", None, "en").unwrap();
        assert_eq!(batch.len(), 4);

        let cached: EpisodeSource<'_, Catalog> = EpisodeSource::CachedBatch(&batch);
        assert_eq!(
            cached
                .find_title("1", Some(2), 1, NumberingScheme::Default)
                .unwrap(),
            "Return"
        );
        assert_eq!(
            cached.find_title("1", Some(1), 3, NumberingScheme::Dvd).unwrap(),
            "Second"
        );
        assert!(matches!(
            cached.find_title("1", Some(1), 2, NumberingScheme::Dvd),
            Err(TitleError::NotFound { .. })
        ));
    }

    #[test]
    fn test_season_batch() {
        let provider = catalog();
        let batch = BatchCache::fetch(&provider, "1", Some(2), "en").unwrap();
        assert_eq!(batch.season(), Some(2));
        assert_eq!(batch.len(), 1);

        let cached: EpisodeSource<'_, Catalog> = EpisodeSource::CachedBatch(&batch);
        assert!(matches!(
            cached.find_title("1", Some(1), 1, NumberingScheme::Default),
            Err(TitleError::NotFound { .. })
        ));
    }

    #[test]
    fn test_batch_of_other_series() {
        let provider = catalog();
        let batch = BatchCache::fetch(&provider, "1", None, "en").unwrap();
        let cached: EpisodeSource<'_, Catalog> = EpisodeSource::CachedBatch(&batch);

        assert!(matches!(
            cached.find_title("2", Some(1), 1, NumberingScheme::Default),
            Err(TitleError::SeriesMismatch { .. })
        ));
    }

    #[test]
    fn test_batch_fetch_failure() {
        let provider = catalog();
        assert!(BatchCache::fetch(&provider, "broken", None, "en").is_err());
    }
}
