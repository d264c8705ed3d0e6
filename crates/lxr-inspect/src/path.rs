//! Path helpers shared by the inspection commands.

use std::borrow::Cow;

use clap::ValueEnum;

/// Separator used by manifest paths regardless of platform.
pub const SEPARATOR: char = '/';

/// How a host stores paths in its manifests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PathEncoding {
    /// Special characters are stored as `%XX` escapes (web-safe form).
    #[default]
    Percent,
    /// Paths are stored verbatim.
    Plain,
}

impl PathEncoding {
    /// Returns the user-facing form of a stored manifest path.
    pub fn decode(self, encoded: &str) -> String {
        match self {
            Self::Percent => percent_decode(encoded),
            Self::Plain => encoded.to_string(),
        }
    }
}

/// Normalizes a directory path into a prefix ending in `/`.
///
/// An empty path stays empty and means the repository root.
pub fn normalize_prefix(path: &str) -> String {
    let mut prefix = path.to_string();
    if !prefix.is_empty() && !prefix.ends_with(SEPARATOR) {
        prefix.push(SEPARATOR);
    }

    prefix
}

/// Returns whether `path` names a directory from the caller's point of view.
pub fn is_directory_like(path: &str) -> bool {
    path.is_empty() || path.ends_with(SEPARATOR)
}

/// Decodes `%XX` escapes in `encoded`.
///
/// Malformed escapes are kept literally. When the decoded bytes are not valid
/// UTF-8 the input is returned unchanged.
pub fn percent_decode(encoded: &str) -> String {
    urlencoding::decode(encoded).map_or_else(|_| encoded.to_string(), Cow::into_owned)
}
