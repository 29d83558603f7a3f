/// TVMaze metadata provider implementation.
use super::tvmaze_types::{TvMazeEpisode, TvMazeSearchResult};
use super::{EpisodeRecord, MetadataProvider, MetadataRetrievalError, SeriesSummary};
use reqwest::StatusCode;
use reqwest::blocking::Response;

/// Metadata provider for the TVMaze API.
///
/// This provider fetches series and episode information from
/// https://api.tvmaze.com. TVMaze serves a single language and has no DVD
/// ordering, so the language argument is ignored and DVD fields stay empty.
pub struct TvMazeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TvMazeProvider {
    /// Creates a new TVMaze provider instance.
    pub fn new() -> Self {
        Self::with_base_url("https://api.tvmaze.com")
    }

    /// Creates a provider talking to a different TVMaze compatible host.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Converts a TVMaze episode to our internal EpisodeRecord structure.
    ///
    /// Specials without an episode number are dropped.
    fn convert_episode(series_id: &str, tvmaze_episode: TvMazeEpisode) -> Option<EpisodeRecord> {
        Some(EpisodeRecord {
            series_id: series_id.to_string(),
            season_number: tvmaze_episode.season,
            episode_number: tvmaze_episode.number?,
            dvd_season: String::new(),
            dvd_episode_number: String::new(),
            episode_name: tvmaze_episode.name.unwrap_or_default(),
        })
    }

    /// Sends a GET request and checks the status code.
    ///
    /// Returns `None` for 404 responses.
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Response>, MetadataRetrievalError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| MetadataRetrievalError::RequestError(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(MetadataRetrievalError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(Some(response))
    }
}

impl Default for TvMazeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for TvMazeProvider {
    fn search_series(
        &self,
        name: &str,
        _language: &str,
    ) -> Result<Vec<SeriesSummary>, MetadataRetrievalError> {
        let Some(response) = self.get("/search/shows", &[("q", name.to_string())])? else {
            return Ok(Vec::new());
        };

        let results: Vec<TvMazeSearchResult> = response
            .json()
            .map_err(|e| MetadataRetrievalError::ParseError(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|result| SeriesSummary {
                id: result.show.id.to_string(),
                name: result.show.name,
            })
            .collect())
    }

    fn episode(
        &self,
        series_id: &str,
        season: u32,
        episode: u32,
        _language: &str,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
        let path = format!("/shows/{series_id}/episodebynumber");
        let query = [("season", season.to_string()), ("number", episode.to_string())];
        let Some(response) = self.get(&path, &query)? else {
            return Ok(None);
        };

        let tvmaze_episode: TvMazeEpisode = response
            .json()
            .map_err(|e| MetadataRetrievalError::ParseError(e.to_string()))?;

        Ok(Self::convert_episode(series_id, tvmaze_episode))
    }

    fn all_episodes(
        &self,
        series_id: &str,
        _language: &str,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        let path = format!("/shows/{series_id}/episodes");
        let response = self
            .get(&path, &[])?
            .ok_or_else(|| MetadataRetrievalError::SeriesNotFound(series_id.to_string()))?;

        let episodes: Vec<TvMazeEpisode> = response
            .json()
            .map_err(|e| MetadataRetrievalError::ParseError(e.to_string()))?;

        Ok(episodes
            .into_iter()
            .filter_map(|episode| Self::convert_episode(series_id, episode))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"[
            {"score": 0.9, "show": {"id": 169, "name": "Breaking Bad", "language": "English"}},
            {"score": 0.4, "show": {"id": 42, "name": "Breaking Bad Habits"}}
        ]"#;
        let results: Vec<TvMazeSearchResult> = serde_json::from_str(json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].show.id, 169);
        assert_eq!(results[0].show.name, "Breaking Bad");
    }

    #[test]
    fn test_convert_episode() {
        let json = r#"{"id": 12192, "name": "Pilot", "season": 1, "number": 1, "summary": "<p>x</p>"}"#;
        let episode: TvMazeEpisode = serde_json::from_str(json).unwrap();
        let record = TvMazeProvider::convert_episode("169", episode).unwrap();

        assert_eq!(record.series_id, "169");
        assert_eq!(record.season_number, 1);
        assert_eq!(record.episode_number, 1);
        assert_eq!(record.episode_name, "Pilot");
        assert!(record.dvd_season.is_empty());
    }

    #[test]
    fn test_specials_without_number_are_dropped() {
        let json = r#"[
            {"name": "Special", "season": 1, "number": null},
            {"name": null, "season": 1, "number": 2}
        ]"#;
        let episodes: Vec<TvMazeEpisode> = serde_json::from_str(json).unwrap();
        let records: Vec<EpisodeRecord> = episodes
            .into_iter()
            .filter_map(|e| TvMazeProvider::convert_episode("1", e))
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].episode_number, 2);
        assert_eq!(records[0].episode_name, "");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = TvMazeProvider::with_base_url("http://localhost:8080/");
        assert_eq!(provider.base_url, "http://localhost:8080");
    }
}
