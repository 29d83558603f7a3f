//! Cached metadata provider implementation
//!
//! This module provides a caching wrapper for metadata providers that
//! automatically stores and retrieves search results and episode lists from a
//! local cache.

use super::{EpisodeRecord, MetadataProvider, MetadataRetrievalError, SeriesSummary};
use crate::cache::{CacheError, CacheStorage};
use std::time::Duration;

/// How long cached responses are reused
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A caching wrapper for metadata providers
///
/// This provider wraps another metadata provider and caches series searches
/// and full episode lists to avoid redundant network requests. The cache is
/// persistent across application runs. Single episode lookups are passed
/// through unchanged.
pub struct CachedMetadataProvider<P>
where
    P: MetadataProvider,
{
    /// The underlying metadata provider
    provider: P,
    /// Cache storage for series search results
    searches: CacheStorage<Vec<SeriesSummary>>,
    /// Cache storage for episode lists
    episodes: CacheStorage<Vec<EpisodeRecord>>,
}

impl<P> CachedMetadataProvider<P>
where
    P: MetadataProvider,
{
    /// Creates a new cached metadata provider in the system cache directory
    pub fn new(provider: P) -> Result<Self, CacheError> {
        Ok(Self {
            provider,
            searches: CacheStorage::open("series_search", Some(CACHE_TTL))?,
            episodes: CacheStorage::open("episodes", Some(CACHE_TTL))?,
        })
    }

    /// Creates a cached provider storing its entries below `base_dir`
    pub fn with_cache_dir(provider: P, base_dir: &std::path::Path) -> Result<Self, CacheError> {
        Ok(Self {
            provider,
            searches: CacheStorage::open_in(base_dir, "series_search", Some(CACHE_TTL))?,
            episodes: CacheStorage::open_in(base_dir, "episodes", Some(CACHE_TTL))?,
        })
    }
}

impl<P> MetadataProvider for CachedMetadataProvider<P>
where
    P: MetadataProvider,
{
    fn search_series(
        &self,
        name: &str,
        language: &str,
    ) -> Result<Vec<SeriesSummary>, MetadataRetrievalError> {
        let cache_key = format!("{language}_{name}");

        // Cache read errors fall through to the provider
        if let Ok(Some(results)) = self.searches.load(&cache_key) {
            return Ok(results);
        }

        let results = self.provider.search_series(name, language)?;

        // Store in cache (ignore errors to avoid failing the request)
        let _ = self.searches.store(&cache_key, &results);

        Ok(results)
    }

    fn episode(
        &self,
        series_id: &str,
        season: u32,
        episode: u32,
        language: &str,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
        self.provider.episode(series_id, season, episode, language)
    }

    fn all_episodes(
        &self,
        series_id: &str,
        language: &str,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        let cache_key = format!("{language}_{series_id}");

        if let Ok(Some(episodes)) = self.episodes.load(&cache_key) {
            return Ok(episodes);
        }

        let episodes = self.provider.all_episodes(series_id, language)?;
        let _ = self.episodes.store(&cache_key, &episodes);

        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingProvider {
        searches: Cell<usize>,
        episode_lists: Cell<usize>,
    }

    impl MetadataProvider for CountingProvider {
        fn search_series(
            &self,
            name: &str,
            _language: &str,
        ) -> Result<Vec<SeriesSummary>, MetadataRetrievalError> {
            self.searches.set(self.searches.get() + 1);
            Ok(vec![SeriesSummary {
                id: "7".to_string(),
                name: name.to_string(),
            }])
        }

        fn episode(
            &self,
            _series_id: &str,
            _season: u32,
            _episode: u32,
            _language: &str,
        ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
            Ok(None)
        }

        fn all_episodes(
            &self,
            series_id: &str,
            _language: &str,
        ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
            self.episode_lists.set(self.episode_lists.get() + 1);
            Ok(vec![EpisodeRecord {
                series_id: series_id.to_string(),
                season_number: 1,
                episode_number: 1,
                dvd_season: String::new(),
                dvd_episode_number: String::new(),
                episode_name: "Pilot".to_string(),
            }])
        }
    }

    #[test]
    fn test_second_search_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cached =
            CachedMetadataProvider::with_cache_dir(CountingProvider::default(), dir.path())
                .unwrap();

        let first = cached.search_series("Show Name", "en").unwrap();
        let second = cached.search_series("Show Name", "en").unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.provider.searches.get(), 1);

        cached.search_series("Show Name", "de").unwrap();
        assert_eq!(cached.provider.searches.get(), 2);
    }

    #[test]
    fn test_non_ascii_names_are_cached_separately() {
        let dir = tempfile::tempdir().unwrap();
        let cached =
            CachedMetadataProvider::with_cache_dir(CountingProvider::default(), dir.path())
                .unwrap();

        let first = cached.search_series("ドラマ", "ja").unwrap();
        let second = cached.search_series("アニメ", "ja").unwrap();
        assert_eq!(first[0].name, "ドラマ");
        assert_eq!(second[0].name, "アニメ");
        assert_eq!(cached.provider.searches.get(), 2);
    }

    #[test]
    fn test_season_episodes_use_cached_list() {
        let dir = tempfile::tempdir().unwrap();
        let cached =
            CachedMetadataProvider::with_cache_dir(CountingProvider::default(), dir.path())
                .unwrap();

        assert_eq!(cached.all_episodes("7", "en").unwrap().len(), 1);
        assert_eq!(cached.season_episodes("7", 1, "en").unwrap().len(), 1);
        assert!(cached.season_episodes("7", 2, "en").unwrap().is_empty());
        assert_eq!(cached.provider.episode_lists.get(), 1);
    }
}
