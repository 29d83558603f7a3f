//! Multipart episode titles
//!
//! A file holding two episodes gets both titles, unless they are the two
//! halves of one story (`Finale (1)` and `Finale (2)`), in which case they are
//! merged into `Finale (1-2)`.

/// The titles written for a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTitles {
    /// Title of the first episode, possibly relabelled `(1-2)`
    pub episode_title: String,
    /// Title of the second episode; empty when merged or absent
    pub multipart_title: String,
}

/// Combines the title of the first episode with the title of the second.
///
/// `multipart_title` is `None` when the file has a single episode or the
/// second title could not be found; both cases leave the multipart title
/// empty.
pub fn merge_titles(episode_title: &str, multipart_title: Option<&str>) -> MergedTitles {
    let Some(multipart_title) = multipart_title.filter(|t| !t.is_empty()) else {
        return MergedTitles {
            episode_title: episode_title.to_string(),
            multipart_title: String::new(),
        };
    };

    let first = episode_title.replace("(1)", "");
    let second = multipart_title.replace("(2)", "");

    if first.trim().to_lowercase() == second.trim().to_lowercase() {
        return MergedTitles {
            episode_title: episode_title.replace("(1)", "(1-2)").trim().to_string(),
            multipart_title: String::new(),
        };
    }

    MergedTitles {
        episode_title: episode_title.to_string(),
        multipart_title: multipart_title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_episode() {
        let merged = merge_titles("Pilot", None);
        assert_eq!(merged.episode_title, "Pilot");
        assert_eq!(merged.multipart_title, "");
    }

    #[test]
    fn test_missing_second_title() {
        let merged = merge_titles("Pilot", Some(""));
        assert_eq!(merged.episode_title, "Pilot");
        assert_eq!(merged.multipart_title, "");
    }

    #[test]
    fn test_two_halves_are_merged() {
        let merged = merge_titles("The Gathering (1)", Some("The Gathering (2)"));
        assert_eq!(merged.episode_title, "The Gathering (1-2)");
        assert_eq!(merged.multipart_title, "");
    }

    #[test]
    fn test_merge_ignores_case() {
        let merged = merge_titles("Finale (1)", Some("FINALE (2)"));
        assert_eq!(merged.episode_title, "Finale (1-2)");
        assert!(merged.multipart_title.is_empty());
    }

    #[test]
    fn test_distinct_titles_are_kept() {
        let merged = merge_titles("Pilot", Some("The Second"));
        assert_eq!(merged.episode_title, "Pilot");
        assert_eq!(merged.multipart_title, "The Second");
    }
}
