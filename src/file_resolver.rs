//! File resolver module for finding episode files
//!
//! This module scans a target path for files whose extension marks them as
//! candidates for renaming. The target may be a single file or a directory.

use crate::tokenizer::extension;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file resolution
#[derive(Debug, Error)]
pub enum FileResolverError {
    /// Target does not exist
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    /// Failed to read directory
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed { path: PathBuf, source: io::Error },

    /// Failed to read directory entry
    #[error("Failed to read directory entry: {0}")]
    ReadEntryFailed(#[from] io::Error),
}

/// A file that is a candidate for renaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeFile {
    /// Path to the file
    pub path: PathBuf,
}

impl EpisodeFile {
    /// The file name without its directory
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Collects the episode files at `target`
///
/// # Arguments
///
/// * `target` - A file or a directory
/// * `recursive` - Whether subdirectories of a directory are visited
/// * `is_valid_extension` - Decides which extensions are collected
///
/// # Returns
///
/// The matching files in depth-first order, entries of each directory sorted
/// by name.
pub fn scan_for_episodes(
    target: &Path,
    recursive: bool,
    is_valid_extension: impl Fn(&str) -> bool,
) -> Result<Vec<EpisodeFile>, FileResolverError> {
    if !target.exists() {
        return Err(FileResolverError::NotFound(target.to_path_buf()));
    }

    let mut episode_files = Vec::new();
    if target.is_dir() {
        scan_directory(target, recursive, &is_valid_extension, &mut episode_files)?;
    } else {
        collect_file(target, &is_valid_extension, &mut episode_files);
    }
    Ok(episode_files)
}

/// Scans a directory, descending into subdirectories when `recursive` is set
fn scan_directory(
    dir_path: &Path,
    recursive: bool,
    is_valid_extension: &impl Fn(&str) -> bool,
    episode_files: &mut Vec<EpisodeFile>,
) -> Result<(), FileResolverError> {
    let mut entries = fs::read_dir(dir_path)
        .map_err(|e| FileResolverError::ReadDirectoryFailed {
            path: dir_path.to_path_buf(),
            source: e,
        })?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if recursive {
                scan_directory(&path, recursive, is_valid_extension, episode_files)?;
            }
        } else if path.is_file() {
            collect_file(&path, is_valid_extension, episode_files);
        }
    }

    Ok(())
}

fn collect_file(
    path: &Path,
    is_valid_extension: &impl Fn(&str) -> bool,
    episode_files: &mut Vec<EpisodeFile>,
) {
    let valid = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(extension)
        .is_some_and(is_valid_extension);

    if valid {
        episode_files.push(EpisodeFile {
            path: path.to_path_buf(),
        });
    } else {
        tracing::debug!("Ignoring {}: not a valid extension", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternConfig;
    use std::fs::{self, File};

    fn names(files: &[EpisodeFile]) -> Vec<&str> {
        files.iter().filter_map(EpisodeFile::file_name).collect()
    }

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("b.S01E02.avi")).unwrap();
        File::create(dir.path().join("a.S01E01.MKV")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(dir.path().join("README")).unwrap();
        fs::create_dir(dir.path().join("season2")).unwrap();
        File::create(dir.path().join("season2").join("c.S02E01.mp4")).unwrap();
        dir
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let config = PatternConfig::default();
        let result = scan_for_episodes(
            Path::new("/nonexistent/path/that/does/not/exist"),
            false,
            |ext| config.is_valid_extension(ext),
        );
        assert!(matches!(result, Err(FileResolverError::NotFound(_))));
    }

    #[test]
    fn test_scan_directory_sorted() {
        let dir = setup();
        let config = PatternConfig::default();
        let files = scan_for_episodes(dir.path(), false, |ext| config.is_valid_extension(ext))
            .unwrap();
        assert_eq!(names(&files), vec!["a.S01E01.MKV", "b.S01E02.avi"]);
    }

    #[test]
    fn test_scan_recursive() {
        let dir = setup();
        let config = PatternConfig::default();
        let files = scan_for_episodes(dir.path(), true, |ext| config.is_valid_extension(ext))
            .unwrap();
        assert_eq!(
            names(&files),
            vec!["a.S01E01.MKV", "b.S01E02.avi", "c.S02E01.mp4"]
        );
    }

    #[test]
    fn test_scan_single_file() {
        let dir = setup();
        let config = PatternConfig::default();
        let target = dir.path().join("b.S01E02.avi");
        let files =
            scan_for_episodes(&target, false, |ext| config.is_valid_extension(ext)).unwrap();
        assert_eq!(files, vec![EpisodeFile { path: target }]);

        let ignored = dir.path().join("notes.txt");
        let files =
            scan_for_episodes(&ignored, false, |ext| config.is_valid_extension(ext)).unwrap();
        assert!(files.is_empty());
    }
}
