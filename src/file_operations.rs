use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a proposed rename is not carried out
#[derive(Debug, Error)]
pub enum FileOperationError {
    #[error("Episode title not found, not renaming")]
    TitleNotFound,

    #[error("Multipart episode title not found, not renaming")]
    MultipartTitleNotFound,

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Failed to rename {from} to {to}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// A computed new name for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameProposal {
    /// Current path of the file
    pub source: PathBuf,
    /// Path the file would be renamed to, in the same directory
    pub destination: PathBuf,
    /// The new file name, extension included
    pub new_name: String,
    /// Whether the episode title was found
    pub title_found: bool,
    /// Why the title lookup failed, if it did
    pub title_error: Option<String>,
    /// Whether the file holds a second episode
    pub multipart_present: bool,
    /// Whether the title of the second episode was found
    pub multipart_title_found: bool,
}

impl RenameProposal {
    pub fn new(source: &Path, new_name: String) -> Self {
        let destination = source
            .parent()
            .map(|p| p.join(&new_name))
            .unwrap_or_else(|| PathBuf::from(&new_name));

        Self {
            source: source.to_path_buf(),
            destination,
            new_name,
            title_found: true,
            title_error: None,
            multipart_present: false,
            multipart_title_found: false,
        }
    }

    /// Whether the file already carries the proposed name
    pub fn is_already_named(&self) -> bool {
        self.source.file_name().and_then(|n| n.to_str()) == Some(self.new_name.as_str())
    }
}

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The file was renamed
    Renamed,
    /// The file would have been renamed
    Simulated,
    /// The file already had the proposed name
    AlreadyNamed,
}

/// Checks the conditions for a rename and performs it unless `simulate` is set
///
/// The checks run in this order: title found, multipart title found (only
/// for multipart files), name differs from the current one, nothing exists
/// at the destination.
pub fn execute_rename(
    proposal: &RenameProposal,
    simulate: bool,
) -> Result<RenameOutcome, FileOperationError> {
    if !proposal.title_found {
        return Err(FileOperationError::TitleNotFound);
    }
    if proposal.multipart_present && !proposal.multipart_title_found {
        return Err(FileOperationError::MultipartTitleNotFound);
    }
    if proposal.is_already_named() {
        return Ok(RenameOutcome::AlreadyNamed);
    }
    if proposal.destination.exists() {
        return Err(FileOperationError::DestinationExists(
            proposal.destination.clone(),
        ));
    }

    if simulate {
        return Ok(RenameOutcome::Simulated);
    }

    fs::rename(&proposal.source, &proposal.destination).map_err(|e| {
        FileOperationError::RenameFailed {
            from: proposal.source.clone(),
            to: proposal.destination.clone(),
            source: e,
        }
    })?;

    Ok(RenameOutcome::Renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn proposal(dir: &Path, from: &str, to: &str) -> RenameProposal {
        RenameProposal::new(&dir.join(from), to.to_string())
    }

    #[test]
    fn test_destination_in_same_directory() {
        let proposal = RenameProposal::new(Path::new("/tv/show/a.avi"), "b.avi".to_string());
        assert_eq!(proposal.destination, PathBuf::from("/tv/show/b.avi"));
        assert!(!proposal.is_already_named());

        let same = RenameProposal::new(Path::new("/tv/show/a.avi"), "a.avi".to_string());
        assert!(same.is_already_named());
    }

    #[test]
    fn test_rename() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.avi")).unwrap();

        let proposal = proposal(dir.path(), "a.avi", "Show - 1x01 - Pilot.avi");
        let outcome = execute_rename(&proposal, false).unwrap();

        assert_eq!(outcome, RenameOutcome::Renamed);
        assert!(!dir.path().join("a.avi").exists());
        assert!(dir.path().join("Show - 1x01 - Pilot.avi").is_file());
    }

    #[test]
    fn test_simulate_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.avi")).unwrap();

        let proposal = proposal(dir.path(), "a.avi", "b.avi");
        assert_eq!(
            execute_rename(&proposal, true).unwrap(),
            RenameOutcome::Simulated
        );
        assert!(dir.path().join("a.avi").is_file());
        assert!(!dir.path().join("b.avi").exists());
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.avi")).unwrap();
        fs::write(dir.path().join("b.avi"), "keep").unwrap();

        let proposal = proposal(dir.path(), "a.avi", "b.avi");
        assert!(matches!(
            execute_rename(&proposal, false),
            Err(FileOperationError::DestinationExists(_))
        ));
        assert!(dir.path().join("a.avi").is_file());
        assert_eq!(fs::read_to_string(dir.path().join("b.avi")).unwrap(), "keep");
    }

    #[test]
    fn test_missing_titles_block_rename() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.avi")).unwrap();

        let mut untitled = proposal(dir.path(), "a.avi", "b.avi");
        untitled.title_found = false;
        assert!(matches!(
            execute_rename(&untitled, false),
            Err(FileOperationError::TitleNotFound)
        ));

        let mut multipart = proposal(dir.path(), "a.avi", "b.avi");
        multipart.multipart_present = true;
        assert!(matches!(
            execute_rename(&multipart, false),
            Err(FileOperationError::MultipartTitleNotFound)
        ));

        assert!(dir.path().join("a.avi").is_file());
    }

    #[test]
    fn test_already_named() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.avi")).unwrap();

        let proposal = proposal(dir.path(), "a.avi", "a.avi");
        assert_eq!(
            execute_rename(&proposal, false).unwrap(),
            RenameOutcome::AlreadyNamed
        );
    }

    #[test]
    fn test_rename_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let proposal = proposal(dir.path(), "missing.avi", "b.avi");
        assert!(matches!(
            execute_rename(&proposal, false),
            Err(FileOperationError::RenameFailed { .. })
        ));
    }
}
