//! Collaborator contract between the inspection commands and the
//! version-control runtime that owns the repository.
//!
//! The commands never touch storage directly. Everything they know about a
//! revision comes through [`Repository`], which a host runtime implements
//! (see [`crate::git::GitRepository`] for the bundled one).

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Failures raised by a host runtime.
///
/// Commands propagate these unchanged to the invocation boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("unknown revision '{0}'")]
    RevisionNotFound(String),

    #[error("{path}: no such file in rev {revision}")]
    FileNotFound { path: String, revision: String },

    #[error("{0}")]
    Backend(String),
}

/// A resolved point in history.
///
/// Only a host can mint one, from a user-supplied revision string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    id: String,
}

impl Revision {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Opaque token identifying one file's content inside a manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileNode(String);

impl FileNode {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Revision-scoped mapping from full, possibly encoded, file paths to their
/// content nodes. Directories are never keyed, only files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, FileNode>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, node: FileNode) {
        self.entries.insert(path.into(), node);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileNode)> {
        self.entries
            .iter()
            .map(|(path, node)| (path.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>> FromIterator<(P, FileNode)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (P, FileNode)>>(iter: I) -> Self {
        let mut manifest = Self::new();
        for (path, node) in iter {
            manifest.insert(path, node);
        }

        manifest
    }
}

/// One file at one revision, as handed out by [`Repository::file_context`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHandle {
    /// Repository-relative path the handle was requested for.
    pub path: String,
    /// Revision the handle belongs to.
    pub revision: Revision,
    /// Content node backing the file.
    pub node: FileNode,
}

/// Read-only view of a repository supplied by the host runtime.
///
/// Production uses [`crate::git::GitRepository`], while tests inject
/// `MockRepository` to script manifests and failures.
#[cfg_attr(test, mockall::automock)]
pub trait Repository {
    /// Resolves `rev` (`.` meaning the current checkout) into a revision.
    ///
    /// # Errors
    /// Returns [`HostError::RevisionNotFound`] when `rev` names nothing.
    fn resolve_revision(&self, rev: &str) -> Result<Revision, HostError>;

    /// Loads the full manifest of `revision`.
    ///
    /// # Errors
    /// Returns an error when the host cannot read the revision's tree.
    fn manifest(&self, revision: &Revision) -> Result<Manifest, HostError>;

    /// Looks up the file stored at `path` in `revision`.
    ///
    /// # Errors
    /// Returns [`HostError::FileNotFound`] when `path` is not a file there.
    fn file_context(&self, revision: &Revision, path: &str) -> Result<FileHandle, HostError>;

    /// Returns the stored byte length of `file` without reading its content.
    ///
    /// # Errors
    /// Returns an error when the host cannot read the file metadata.
    fn file_size(&self, file: &FileHandle) -> Result<u64, HostError>;

    /// Reverses the storage encoding applied to manifest paths.
    fn decode_path(&self, encoded: &str) -> String;
}
