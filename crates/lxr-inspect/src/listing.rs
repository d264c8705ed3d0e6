//! `ls-onelevel`: immediate children of one directory at one revision.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use tracing::debug;

use crate::host::{HostError, Repository};
use crate::path::{SEPARATOR, normalize_prefix};

/// Immediate children of a directory, split into subdirectories and files.
///
/// Both groups are kept sorted, so rendering is deterministic.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Names of direct subdirectories, without the trailing separator.
    pub directories: BTreeSet<String>,
    /// Names of direct files, mapped to the raw manifest path they came from.
    pub files: BTreeMap<String, String>,
}

impl DirectoryListing {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

/// Lists the immediate children of `path` at revision `rev`.
///
/// A `path` that names a file, or nothing at all, yields an empty listing.
///
/// # Errors
/// Returns an error when `rev` cannot be resolved or its manifest cannot be
/// loaded.
pub fn list_one_level(
    repository: &dyn Repository,
    rev: &str,
    path: &str,
) -> Result<DirectoryListing, HostError> {
    let revision = repository.resolve_revision(rev)?;
    let manifest = repository.manifest(&revision)?;
    debug!(
        revision = %revision,
        entries = manifest.len(),
        "Loaded manifest"
    );

    let prefix = normalize_prefix(path);
    let mut listing = DirectoryListing::default();

    for (full_path, _node) in manifest.iter() {
        let decoded = repository.decode_path(full_path);
        let Some(remainder) = decoded.strip_prefix(prefix.as_str()) else {
            continue;
        };

        match remainder.split_once(SEPARATOR) {
            Some((directory, _)) => {
                listing.directories.insert(directory.to_string());
            }
            None => {
                listing
                    .files
                    .insert(remainder.to_string(), full_path.to_string());
            }
        }
    }

    debug!(
        prefix = %prefix,
        directories = listing.directories.len(),
        files = listing.files.len(),
        "Classified manifest entries"
    );

    Ok(listing)
}

/// Writes `listing` one name per line: directories first with a trailing
/// `/`, then files.
///
/// # Errors
/// Returns an error when writing to `out` fails.
pub fn write_listing(out: &mut dyn Write, listing: &DirectoryListing) -> io::Result<()> {
    for directory in &listing.directories {
        writeln!(out, "{directory}{SEPARATOR}")?;
    }
    for file in listing.files.keys() {
        writeln!(out, "{file}")?;
    }

    Ok(())
}
