//! Episode number extraction
//!
//! Finds the season/episode marker in a filename (`S01E02`, `1x02`,
//! `S01E02E03`, ...) under one of the numbering schemes and derives the
//! series fragment that precedes it.
//!
//! The marker must be bounded by characters that are neither digits nor
//! parentheses, so `(2010)` in `Human Target (2010) - 1x01.avi` is never taken
//! for an episode number. A bare year such as `Doctor.Who.2005.S01E01.avi`
//! still looks like `20x05`; an [`AnchorHeuristic`] decides whether to look
//! for a later marker in that case.

use crate::config::{ConfigError, NumberingScheme, PatternConfig};
use crate::tokenizer::Tokenizer;
use regex::{Captures, Regex};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Season part of the second episode in a multipart marker
const MULTIPART_SEASON: &str = "(?i)s?[0-9]{0,2}";

/// Episode part of the second episode in a multipart marker
const MULTIPART_EPISODE: &str = "(?i)[ex]?[0-9]{2}";

/// Errors that can occur during episode number extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The filename contains no season/episode marker
    #[error("No season/episode numbers found in '{0}'")]
    NoMatch(String),

    /// A matched number could not be parsed
    #[error("Could not parse {part} number from '{value}'")]
    InvalidNumber { part: &'static str, value: String },
}

/// The result of parsing a single filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    /// The filename that was parsed
    pub raw_name: String,
    /// Series name derived from everything before the marker
    pub cleaned_series_fragment: String,
    /// Season number, absent under absolute numbering
    pub season_number: Option<u32>,
    /// Episode number
    pub episode_number: u32,
    /// Second episode number of a multipart file
    pub multipart_episode_number: Option<u32>,
}

/// Location of a candidate marker inside a filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberMatch {
    /// Byte range of the whole match, boundary characters included
    pub span: Range<usize>,
    /// Byte range of the season and episode numbers
    pub numbers: Range<usize>,
}

impl NumberMatch {
    fn from_captures(captures: &Captures<'_>) -> Self {
        let whole = captures.get_match();
        let episode = captures.name("episode").map_or(whole.range(), |m| m.range());
        let start = captures
            .name("season")
            .map_or(episode.start, |m| m.start());

        Self {
            span: whole.range(),
            numbers: start..episode.end,
        }
    }
}

/// Strategy for rejecting a first marker that is likely part of the title
///
/// This is a heuristic. It can produce false matches for titles that
/// contain numbers and can be swapped out or disabled with [`NoHeuristic`].
pub trait AnchorHeuristic: fmt::Debug + Send + Sync {
    /// Returns the byte offset from which to search for a better marker, or
    /// `None` to accept `candidate`.
    fn retry_from(&self, filename: &str, candidate: &NumberMatch) -> Option<usize>;
}

/// Retries once when the first marker is a bare year between 1900 and 2099
///
/// `Doctor.Who.2005.S01E01.avi` first matches `2005` as season 20, episode
/// 05. The search is repeated from the boundary that closed that match; if
/// nothing is found there the first match stands. Three digit markers such
/// as `Show.101.HDTV.x264.avi` are never retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearLikeDigits;

impl AnchorHeuristic for YearLikeDigits {
    fn retry_from(&self, filename: &str, candidate: &NumberMatch) -> Option<usize> {
        let numbers = filename.get(candidate.numbers.clone())?;
        let year_like = numbers.len() == 4
            && numbers.bytes().all(|b| b.is_ascii_digit())
            && (numbers.starts_with("19") || numbers.starts_with("20"));
        if !year_like {
            return None;
        }

        let boundary = filename.get(..candidate.span.end)?.chars().next_back()?;
        Some(candidate.span.end - boundary.len_utf8())
    }
}

/// Always accepts the first marker
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeuristic;

impl AnchorHeuristic for NoHeuristic {
    fn retry_from(&self, _filename: &str, _candidate: &NumberMatch) -> Option<usize> {
        None
    }
}

/// Extracts season, episode and multipart numbers from filenames
#[derive(Debug)]
pub struct EpisodeNumberExtractor {
    seasonal: Regex,
    absolute: Regex,
    tokenizer: Tokenizer,
    heuristic: Box<dyn AnchorHeuristic>,
}

impl EpisodeNumberExtractor {
    /// Compiles the marker patterns from the configured fragments
    pub fn new(config: &PatternConfig) -> Result<Self, ConfigError> {
        let seasonal = format!(
            "[^0-9(](?P<season>{})(?P<episode>{})(?:-?(?:{MULTIPART_SEASON})(?P<multipart>{MULTIPART_EPISODE}))?[^0-9)]",
            config.season, config.episode
        );
        let absolute = format!(
            "[^0-9(](?P<episode>{})(?:-?(?P<multipart>{MULTIPART_EPISODE}))?[^0-9)]",
            config.episode
        );

        Ok(Self {
            seasonal: Regex::new(&seasonal).map_err(|e| ConfigError::InvalidPattern {
                field: "season/episode",
                source: e,
            })?,
            absolute: Regex::new(&absolute).map_err(|e| ConfigError::InvalidPattern {
                field: "episode",
                source: e,
            })?,
            tokenizer: Tokenizer::new(&config.word_separators)?,
            heuristic: Box::new(YearLikeDigits),
        })
    }

    /// Replaces the disambiguation heuristic
    pub fn with_heuristic<H>(mut self, heuristic: H) -> Self
    where
        H: AnchorHeuristic + 'static,
    {
        self.heuristic = Box::new(heuristic);
        self
    }

    /// Parses `filename` under the given numbering scheme
    pub fn extract(
        &self,
        filename: &str,
        scheme: NumberingScheme,
    ) -> Result<ParsedFilename, ExtractError> {
        let regex = match scheme {
            NumberingScheme::Absolute => &self.absolute,
            NumberingScheme::Default | NumberingScheme::Dvd => &self.seasonal,
        };

        let mut captures = regex
            .captures(filename)
            .ok_or_else(|| ExtractError::NoMatch(filename.to_string()))?;

        let candidate = NumberMatch::from_captures(&captures);
        if let Some(start) = self.heuristic.retry_from(filename, &candidate) {
            if let Some(retry) = regex.captures_at(filename, start) {
                tracing::debug!(
                    "Skipping title digits '{}' in '{}'",
                    &filename[candidate.numbers.clone()],
                    filename
                );
                captures = retry;
            }
        }

        let season_number = captures
            .name("season")
            .map(|m| parse_number(m.as_str(), &['s', 'S'], "season"))
            .transpose()?;
        let episode_number = captures
            .name("episode")
            .map(|m| parse_number(m.as_str(), &['e', 'E', 'x', 'X'], "episode"))
            .transpose()?
            .ok_or_else(|| ExtractError::NoMatch(filename.to_string()))?;
        let multipart_episode_number = captures
            .name("multipart")
            .filter(|m| !m.as_str().is_empty())
            .map(|m| parse_number(m.as_str(), &['e', 'E', 'x', 'X'], "multipart episode"))
            .transpose()?;

        let start = captures.get_match().start();
        let cleaned_series_fragment = self.tokenizer.clean(&filename[..start]);

        tracing::debug!(
            "Parsed '{}': series '{}', season {:?}, episode {}, multipart {:?}",
            filename,
            cleaned_series_fragment,
            season_number,
            episode_number,
            multipart_episode_number
        );

        Ok(ParsedFilename {
            raw_name: filename.to_string(),
            cleaned_series_fragment,
            season_number,
            episode_number,
            multipart_episode_number,
        })
    }
}

/// Strips marker letters and parses the remaining digits
///
/// Parsing drops leading zeros while keeping a lone `0`.
fn parse_number(text: &str, markers: &[char], part: &'static str) -> Result<u32, ExtractError> {
    let digits = text.trim().trim_start_matches(markers);
    digits.parse().map_err(|_| ExtractError::InvalidNumber {
        part,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> EpisodeNumberExtractor {
        EpisodeNumberExtractor::new(&PatternConfig::default()).unwrap()
    }

    fn numbers(filename: &str) -> (Option<u32>, u32, Option<u32>) {
        let parsed = extractor()
            .extract(filename, NumberingScheme::Default)
            .unwrap();
        (
            parsed.season_number,
            parsed.episode_number,
            parsed.multipart_episode_number,
        )
    }

    #[test]
    fn test_season_episode_markers() {
        assert_eq!(numbers("Show.Name.S01E02.avi"), (Some(1), 2, None));
        assert_eq!(numbers("Show.Name.s1e02.avi"), (Some(1), 2, None));
        assert_eq!(numbers("Show.Name.1x02.avi"), (Some(1), 2, None));
        assert_eq!(numbers("Show Name - 12x10 - Title.mkv"), (Some(12), 10, None));
        assert_eq!(numbers("Show.Name.S10E00.avi"), (Some(10), 0, None));
    }

    #[test]
    fn test_following_tags_are_not_multipart() {
        assert_eq!(numbers("Show.Name.S01E02.720p.HDTV.avi"), (Some(1), 2, None));
    }

    #[test]
    fn test_multipart_markers() {
        assert_eq!(numbers("Show.Name.S01E02E03.avi"), (Some(1), 2, Some(3)));
        assert_eq!(numbers("Show.Name.S01E02-E03.avi"), (Some(1), 2, Some(3)));
        assert_eq!(numbers("Show.Name.S01E02-S01E03.avi"), (Some(1), 2, Some(3)));
        assert_eq!(numbers("Show.Name.1x02-03.avi"), (Some(1), 2, Some(3)));
    }

    #[test]
    fn test_series_fragment() {
        let parsed = extractor()
            .extract("Show.Name.S01E01.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Show Name");
        assert_eq!(parsed.raw_name, "Show.Name.S01E01.avi");

        let parsed = extractor()
            .extract("Show Name - 1x01 - Pilot.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Show Name");
    }

    #[test]
    fn test_parenthesised_year_is_not_a_marker() {
        let parsed = extractor()
            .extract("Human Target (2010) - 1x01.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Human Target (2010)");
        assert_eq!((parsed.season_number, parsed.episode_number), (Some(1), 1));
    }

    #[test]
    fn test_year_in_title_is_skipped() {
        let parsed = extractor()
            .extract("Doctor.Who.2005.S01E02.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Doctor Who 2005");
        assert_eq!((parsed.season_number, parsed.episode_number), (Some(1), 2));
    }

    #[test]
    fn test_year_heuristic_can_be_disabled() {
        let parsed = extractor()
            .with_heuristic(NoHeuristic)
            .extract("Doctor.Who.2005.S01E02.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Doctor Who");
        assert_eq!((parsed.season_number, parsed.episode_number), (Some(20), 5));
    }

    #[test]
    fn test_digit_marker_kept_without_alternative() {
        assert_eq!(numbers("Show.Name.102.avi"), (Some(1), 2, None));
    }

    #[test]
    fn test_three_digit_marker_before_release_tags() {
        let parsed = extractor()
            .extract("Show.Name.101.HDTV.x264-LOL.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Show Name");
        assert_eq!((parsed.season_number, parsed.episode_number), (Some(1), 1));

        let parsed = extractor()
            .extract("Show.Name.102.720p.avi", NumberingScheme::Default)
            .unwrap();
        assert_eq!(parsed.cleaned_series_fragment, "Show Name");
        assert_eq!((parsed.season_number, parsed.episode_number), (Some(1), 2));
    }

    #[test]
    fn test_dvd_uses_seasonal_markers() {
        let parsed = extractor()
            .extract("Show.Name.S02E05.avi", NumberingScheme::Dvd)
            .unwrap();
        assert_eq!((parsed.season_number, parsed.episode_number), (Some(2), 5));
    }

    #[test]
    fn test_absolute_markers() {
        let parsed = extractor()
            .extract("Show Name - 12.avi", NumberingScheme::Absolute)
            .unwrap();
        assert_eq!(parsed.season_number, None);
        assert_eq!(parsed.episode_number, 12);
        assert_eq!(parsed.cleaned_series_fragment, "Show Name");

        let parsed = extractor()
            .extract("Show.Name.E05-06.avi", NumberingScheme::Absolute)
            .unwrap();
        assert_eq!(parsed.episode_number, 5);
        assert_eq!(parsed.multipart_episode_number, Some(6));
    }

    #[test]
    fn test_no_marker() {
        let result = extractor().extract("Holiday Video.avi", NumberingScheme::Default);
        assert!(matches!(result, Err(ExtractError::NoMatch(_))));
    }

    #[test]
    fn test_invalid_fragment() {
        let config = PatternConfig {
            season: "(".to_string(),
            ..PatternConfig::default()
        };
        assert!(EpisodeNumberExtractor::new(&config).is_err());
    }

    #[test]
    fn test_year_like_digits() {
        let filename = "A.2005.B";
        let candidate = NumberMatch {
            span: 1..7,
            numbers: 2..6,
        };
        assert_eq!(YearLikeDigits.retry_from(filename, &candidate), Some(6));

        let filename = "A.S01E02.B";
        let candidate = NumberMatch {
            span: 1..9,
            numbers: 2..8,
        };
        assert_eq!(YearLikeDigits.retry_from(filename, &candidate), None);

        let filename = "A.101.B";
        let candidate = NumberMatch {
            span: 1..6,
            numbers: 2..5,
        };
        assert_eq!(YearLikeDigits.retry_from(filename, &candidate), None);

        let filename = "A.1080.B";
        let candidate = NumberMatch {
            span: 1..7,
            numbers: 2..6,
        };
        assert_eq!(YearLikeDigits.retry_from(filename, &candidate), None);
    }
}
