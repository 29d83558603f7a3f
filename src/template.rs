//! Output name templates
//!
//! A template is plain text with `<Name>` placeholders and optional sections
//! in square brackets:
//!
//! ```text
//! <SeriesName> - <SeasonNumber>x<EpisodeNumber>[ - <EpisodeTitle>]
//! ```
//!
//! An optional section is dropped, brackets included, when any placeholder
//! inside it has no value. Sections cannot be nested; a bracket pair without
//! a placeholder is ordinary text. A placeholder outside a section that has
//! no value is left in the output as written and reported.

use crate::multipart::MergedTitles;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

pub const SERIES_NAME: &str = "SeriesName";
pub const SEASON_NUMBER: &str = "SeasonNumber";
pub const EPISODE_NUMBER: &str = "EpisodeNumber";
pub const MULTIPART_EP_NUM: &str = "MultipartEpNum";
pub const EPISODE_TITLE: &str = "EpisodeTitle";
pub const MULTIPART_EP_TITLE: &str = "MultipartEpTitle";

/// Problems found while rendering; none of them stop rendering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderIssue {
    /// A placeholder outside an optional section has no value
    #[error("The value for <{0}> could not be found")]
    Unbound(String),

    /// A value was provided for a placeholder the template does not use
    #[error("No <{0}> placeholder present in the template")]
    NotInTemplate(String),

    /// Only the first occurrence of a placeholder is substituted
    #[error("Placeholder <{0}> occurs more than once, only the first is replaced")]
    Repeated(String),
}

/// Values bound to placeholder names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to the placeholder `name`
    pub fn bind(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Returns the value bound to `name`; empty values count as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Builds the context for an episode file
    ///
    /// Episode numbers are padded to two digits, the season is not.
    pub fn for_episode(
        series_name: &str,
        season: Option<u32>,
        episode: u32,
        multipart_episode: Option<u32>,
        titles: &MergedTitles,
    ) -> Self {
        Self::new()
            .bind(SERIES_NAME, series_name)
            .bind(
                SEASON_NUMBER,
                season.map(|s| s.to_string()).unwrap_or_default(),
            )
            .bind(EPISODE_NUMBER, zero_pad(episode))
            .bind(
                MULTIPART_EP_NUM,
                multipart_episode.map(zero_pad).unwrap_or_default(),
            )
            .bind(EPISODE_TITLE, titles.episode_title.as_str())
            .bind(MULTIPART_EP_TITLE, titles.multipart_title.as_str())
    }
}

/// Pads a number to at least two digits
pub fn zero_pad(number: u32) -> String {
    format!("{number:02}")
}

/// The outcome of rendering a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub issues: Vec<RenderIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
    Optional(Vec<Segment>),
}

/// A parsed output template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template. Parsing never fails; anything that is not a
    /// well-formed placeholder or section is kept as text.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = source;

        while !rest.is_empty() {
            if let Some(section) = rest.strip_prefix('[') {
                let close = section.find(']');
                let reopen = section.find('[');
                if let Some(end) = close.filter(|&end| reopen.is_none_or(|open| open > end)) {
                    let inner = parse_inline(&section[..end]);
                    if inner.iter().any(|s| matches!(s, Segment::Placeholder(_))) {
                        segments.push(Segment::Optional(inner));
                    } else {
                        push_literal(&mut segments, &rest[..end + 2]);
                    }
                    rest = &section[end + 1..];
                    continue;
                }
                push_literal(&mut segments, "[");
                rest = section;
                continue;
            }

            let next = rest.find('[').unwrap_or(rest.len());
            for segment in parse_inline(&rest[..next]) {
                match segment {
                    Segment::Literal(text) => push_literal(&mut segments, &text),
                    other => segments.push(other),
                }
            }
            rest = &rest[next..];
        }

        Self { segments }
    }

    /// Names of all placeholders, in order of appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Placeholder(name) => names.push(name.as_str()),
                Segment::Optional(inner) => {
                    for segment in inner {
                        if let Segment::Placeholder(name) = segment {
                            names.push(name.as_str());
                        }
                    }
                }
                Segment::Literal(_) => {}
            }
        }
        names
    }

    /// Substitutes the values of `context` into the template
    pub fn render(&self, context: &RenderContext) -> Rendered {
        let mut text = String::new();
        let mut issues = Vec::new();
        let mut substituted = HashSet::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Placeholder(name) => match context.get(name) {
                    Some(_) => {
                        substitute(name, context, &mut substituted, &mut text, &mut issues)
                    }
                    None => {
                        issues.push(RenderIssue::Unbound(name.clone()));
                        push_placeholder(&mut text, name);
                    }
                },
                Segment::Optional(inner) => {
                    let complete = inner.iter().all(|s| match s {
                        Segment::Placeholder(name) => context.get(name).is_some(),
                        _ => true,
                    });
                    if !complete {
                        continue;
                    }
                    for segment in inner {
                        match segment {
                            Segment::Placeholder(name) => substitute(
                                name,
                                context,
                                &mut substituted,
                                &mut text,
                                &mut issues,
                            ),
                            Segment::Literal(literal) => text.push_str(literal),
                            Segment::Optional(_) => {}
                        }
                    }
                }
            }
        }

        let used: HashSet<&str> = self.placeholders().into_iter().collect();
        for name in context.values.keys() {
            if context.get(name).is_some() && !used.contains(name.as_str()) {
                issues.push(RenderIssue::NotInTemplate(name.clone()));
            }
        }

        for issue in &issues {
            tracing::warn!("{}", issue);
        }

        Rendered { text, issues }
    }
}

/// Renders `template` with `context`, reporting problems through the log
pub fn render(template: &str, context: &RenderContext) -> String {
    Template::parse(template).render(context).text
}

/// Writes the value of `name` the first time, the placeholder itself after
fn substitute(
    name: &str,
    context: &RenderContext,
    substituted: &mut HashSet<String>,
    text: &mut String,
    issues: &mut Vec<RenderIssue>,
) {
    if !substituted.insert(name.to_string()) {
        issues.push(RenderIssue::Repeated(name.to_string()));
        push_placeholder(text, name);
        return;
    }
    text.push_str(context.get(name).unwrap_or_default());
}

fn push_placeholder(text: &mut String, name: &str) {
    text.push('<');
    text.push_str(name);
    text.push('>');
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}

/// Splits text without sections into literals and placeholders
fn parse_inline(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let name_len = after
            .find('>')
            .filter(|&len| len > 0 && after[..len].chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

        match name_len {
            Some(len) => {
                push_literal(&mut segments, &rest[..open]);
                segments.push(Segment::Placeholder(after[..len].to_string()));
                rest = &after[len + 1..];
            }
            None => {
                push_literal(&mut segments, &rest[..=open]);
                rest = after;
            }
        }
    }

    push_literal(&mut segments, rest);
    segments.retain(|s| !matches!(s, Segment::Literal(text) if text.is_empty()));
    segments
}
