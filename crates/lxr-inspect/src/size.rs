//! `fsize`: byte size of one file at one revision.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::host::{HostError, Repository};
use crate::path::is_directory_like;

/// Outcome of a size query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeReport {
    /// The caller asked about a directory; directories have no size.
    Directory,
    /// Stored byte length of the file.
    File(u64),
}

impl SizeReport {
    pub fn bytes(self) -> u64 {
        match self {
            Self::Directory => 0,
            Self::File(bytes) => bytes,
        }
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// Returns the size of `path` as stored in revision `rev`.
///
/// Paths that are empty or end with `/` are treated as directories and
/// report [`SizeReport::Directory`] once the revision resolves.
///
/// # Errors
/// Returns an error when `rev` cannot be resolved, when `path` is not a file
/// in that revision, or when the host cannot read the file metadata.
pub fn file_size(
    repository: &dyn Repository,
    rev: &str,
    path: &str,
) -> Result<SizeReport, HostError> {
    let revision = repository.resolve_revision(rev)?;
    if is_directory_like(path) {
        debug!(revision = %revision, path, "Directory path has no size");

        return Ok(SizeReport::Directory);
    }

    let file = repository.file_context(&revision, path)?;
    let bytes = repository.file_size(&file)?;
    debug!(
        revision = %revision,
        path,
        node = file.node.as_str(),
        bytes,
        "Read file size"
    );

    Ok(SizeReport::File(bytes))
}

/// Writes `report` as a single integer line.
///
/// # Errors
/// Returns an error when writing to `out` fails.
pub fn write_size(out: &mut dyn Write, report: SizeReport) -> io::Result<()> {
    writeln!(out, "{report}")
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};

    use super::*;
    use crate::host::{FileHandle, FileNode, MockRepository, Revision};

    fn resolving_repository() -> MockRepository {
        let mut repository = MockRepository::new();
        repository
            .expect_resolve_revision()
            .returning(|_| Ok(Revision::new("c0ffee")));

        repository
    }

    fn render(report: SizeReport) -> String {
        let mut out = Vec::new();
        write_size(&mut out, report).expect("Failed to render size");

        String::from_utf8(out).expect("Size is not UTF-8")
    }

    #[test]
    fn test_directory_path_reports_zero_without_lookup() {
        // Arrange
        let mut repository = resolving_repository();
        repository.expect_file_context().never();
        repository.expect_file_size().never();

        // Act
        let report = file_size(&repository, ".", "src/").expect("Failed to size directory");

        // Assert
        assert_eq!(report, SizeReport::Directory);
        assert_eq!(render(report), "0\n");
    }

    #[test]
    fn test_empty_path_reports_zero() {
        // Arrange
        let mut repository = resolving_repository();
        repository.expect_file_context().never();

        // Act
        let report = file_size(&repository, ".", "").expect("Failed to size root");

        // Assert
        assert_eq!(render(report), "0\n");
    }

    #[test]
    fn test_file_reports_stored_size() {
        // Arrange
        let mut repository = resolving_repository();
        repository
            .expect_file_context()
            .with(always(), eq("readme.md"))
            .returning(|revision, path| {
                Ok(FileHandle {
                    path: path.to_string(),
                    revision: revision.clone(),
                    node: FileNode::new("h3"),
                })
            });
        repository
            .expect_file_size()
            .withf(|file| file.node.as_str() == "h3")
            .returning(|_| Ok(42));

        // Act
        let report = file_size(&repository, ".", "readme.md").expect("Failed to size file");

        // Assert
        assert_eq!(report, SizeReport::File(42));
        assert_eq!(render(report), "42\n");
    }

    #[test]
    fn test_missing_file_propagates_not_found() {
        // Arrange
        let mut repository = resolving_repository();
        repository.expect_file_context().returning(|revision, path| {
            Err(HostError::FileNotFound {
                path: path.to_string(),
                revision: revision.id().to_string(),
            })
        });
        repository.expect_file_size().never();

        // Act
        let result = file_size(&repository, ".", "nope.txt");

        // Assert
        assert_eq!(
            result,
            Err(HostError::FileNotFound {
                path: "nope.txt".to_string(),
                revision: "c0ffee".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_revision_fails_before_directory_check() {
        // Arrange
        let mut repository = MockRepository::new();
        repository
            .expect_resolve_revision()
            .returning(|rev| Err(HostError::RevisionNotFound(rev.to_string())));

        // Act
        let result = file_size(&repository, "nope", "src/");

        // Assert
        assert_eq!(result, Err(HostError::RevisionNotFound("nope".to_string())));
    }
}
