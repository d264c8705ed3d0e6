//! Git-backed host runtime.
//!
//! Every query shells out to the `git` CLI through a [`CommandRunner`], which
//! tests replace with `MockCommandRunner`.

use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

use crate::config::Config;
use crate::host::{FileHandle, FileNode, HostError, Manifest, Repository, Revision};
use crate::path::PathEncoding;

/// Revision string meaning "the current checkout".
pub const CURRENT_CHECKOUT: &str = ".";

#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    fn run(&self, command: &mut Command) -> std::io::Result<Output>;
}

pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, command: &mut Command) -> std::io::Result<Output> {
        command.output()
    }
}

/// A git repository read through its object database, never its worktree.
pub struct GitRepository {
    root: PathBuf,
    git: PathBuf,
    path_encoding: PathEncoding,
    runner: Box<dyn CommandRunner>,
}

impl GitRepository {
    /// Opens the repository described by `config` with the real `git` CLI.
    pub fn open(config: &Config) -> Self {
        Self::with_runner(config, Box::new(RealCommandRunner))
    }

    pub fn with_runner(config: &Config, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            root: config.repository.clone(),
            git: config.git.clone(),
            path_encoding: config.path_encoding,
            runner,
        }
    }

    /// Runs `git <args>` in the repository root and returns raw output.
    fn git_output(&self, args: &[&str]) -> Result<Output, HostError> {
        let mut command = Command::new(&self.git);
        command.args(args).current_dir(&self.root);
        debug!(args = ?args, "Running git");

        self.runner.run(&mut command).map_err(|error| {
            HostError::Backend(format!(
                "Failed to execute {}: {error}",
                self.git.display()
            ))
        })
    }

    /// Runs `git <args>` and returns stdout, failing on non-zero exit.
    fn git_stdout(&self, args: &[&str], error_context: &str) -> Result<Vec<u8>, HostError> {
        let output = self.git_output(args)?;
        if !output.status.success() {
            let detail = command_output_detail(&output.stdout, &output.stderr);

            return Err(HostError::Backend(format!("{error_context}: {detail}")));
        }

        Ok(output.stdout)
    }

    /// Looks up the blob stored under exactly `path`.
    fn stored_blob(
        &self,
        revision: &Revision,
        path: &str,
    ) -> Result<Option<FileNode>, HostError> {
        let stdout = self.git_stdout(
            &["ls-tree", "-z", "--full-tree", revision.id(), "--", path],
            "Git ls-tree failed",
        )?;

        Ok(parse_tree_records(&stdout)?
            .into_iter()
            .find(|record| record.kind == "blob" && record.path == path)
            .map(|record| FileNode::new(record.oid)))
    }

    /// Finds the blob whose decoded manifest path equals `path`, so names
    /// printed by a listing can be fed back verbatim.
    fn blob_by_decoded_path(
        &self,
        revision: &Revision,
        path: &str,
    ) -> Result<Option<FileNode>, HostError> {
        if self.path_encoding == PathEncoding::Plain {
            return Ok(None);
        }

        let manifest = self.manifest(revision)?;
        let node = manifest
            .iter()
            .find(|(stored, _)| self.decode_path(stored) == path)
            .map(|(stored, node)| {
                debug!(path, stored, "Matched decoded path to stored path");

                node.clone()
            });

        Ok(node)
    }
}


impl Repository for GitRepository {
    fn resolve_revision(&self, rev: &str) -> Result<Revision, HostError> {
        if rev.is_empty() || rev.starts_with('-') {
            return Err(HostError::RevisionNotFound(rev.to_string()));
        }

        let spec = if rev == CURRENT_CHECKOUT { "HEAD" } else { rev };
        let target = format!("{spec}^{{commit}}");
        let output = self.git_output(&["rev-parse", "--verify", "--quiet", &target])?;
        if !output.status.success() {
            return Err(HostError::RevisionNotFound(rev.to_string()));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(HostError::RevisionNotFound(rev.to_string()));
        }
        debug!(rev, id = %id, "Resolved revision");

        Ok(Revision::new(id))
    }

    fn manifest(&self, revision: &Revision) -> Result<Manifest, HostError> {
        let stdout = self.git_stdout(
            &["ls-tree", "-r", "-z", "--full-tree", revision.id()],
            "Git ls-tree failed",
        )?;

        let mut manifest = Manifest::new();
        for record in parse_tree_records(&stdout)? {
            if record.kind != "blob" {
                debug!(path = %record.path, kind = %record.kind, "Skipping non-file tree entry");
                continue;
            }
            manifest.insert(record.path, FileNode::new(record.oid));
        }

        Ok(manifest)
    }

    fn file_context(&self, revision: &Revision, path: &str) -> Result<FileHandle, HostError> {
        let node = match self.stored_blob(revision, path)? {
            Some(node) => Some(node),
            None => self.blob_by_decoded_path(revision, path)?,
        };

        node.map(|node| FileHandle {
            path: path.to_string(),
            revision: revision.clone(),
            node,
        })
        .ok_or_else(|| HostError::FileNotFound {
            path: path.to_string(),
            revision: revision.id().to_string(),
        })
    }

    fn file_size(&self, file: &FileHandle) -> Result<u64, HostError> {
        let stdout = self.git_stdout(
            &["cat-file", "-s", file.node.as_str()],
            "Git cat-file failed",
        )?;
        let text = String::from_utf8_lossy(&stdout);

        text.trim().parse::<u64>().map_err(|error| {
            HostError::Backend(format!(
                "Unexpected size '{}' for {}: {error}",
                text.trim(),
                file.path
            ))
        })
    }

    fn decode_path(&self, encoded: &str) -> String {
        self.path_encoding.decode(encoded)
    }
}

/// One `git ls-tree -z` record.
#[derive(Debug, PartialEq, Eq)]
struct TreeRecord {
    kind: String,
    oid: String,
    path: String,
}

/// Parses NUL-terminated `<mode> <type> <oid>\t<path>` records.
fn parse_tree_records(stdout: &[u8]) -> Result<Vec<TreeRecord>, HostError> {
    stdout
        .split(|byte| *byte == 0)
        .filter(|record| !record.is_empty())
        .map(|record| {
            let record = String::from_utf8_lossy(record);
            let malformed = || HostError::Backend(format!("Malformed ls-tree record: {record}"));
            let (header, path) = record.split_once('\t').ok_or_else(malformed)?;
            let mut fields = header.split(' ');
            let (Some(_mode), Some(kind), Some(oid), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };

            Ok(TreeRecord {
                kind: kind.to_string(),
                oid: oid.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}

/// Extracts the best human-readable error detail from command output.
fn command_output_detail(stdout: &[u8], stderr: &[u8]) -> String {
    let stderr_text = String::from_utf8_lossy(stderr).trim().to_string();
    if !stderr_text.is_empty() {
        return stderr_text;
    }

    let stdout_text = String::from_utf8_lossy(stdout).trim().to_string();
    if !stdout_text.is_empty() {
        return stdout_text;
    }

    "Unknown git error".to_string()
}
