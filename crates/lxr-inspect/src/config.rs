//! Runtime configuration shared by every command.

use std::path::PathBuf;

use clap::Args;

use crate::path::PathEncoding;

/// Options accepted before or after any subcommand.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Repository to inspect.
    #[arg(
        short = 'R',
        long = "repository",
        env = "LXR_INSPECT_REPOSITORY",
        default_value = ".",
        global = true
    )]
    pub repository: PathBuf,

    /// Git executable used to read the repository.
    #[arg(long, env = "LXR_INSPECT_GIT", default_value = "git", global = true)]
    pub git: PathBuf,

    /// How manifest paths are encoded in storage.
    #[arg(
        long,
        env = "LXR_INSPECT_PATH_ENCODING",
        value_enum,
        default_value_t = PathEncoding::Percent,
        global = true
    )]
    pub path_encoding: PathEncoding,

    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: PathBuf::from("."),
            git: PathBuf::from("git"),
            path_encoding: PathEncoding::default(),
            verbose: false,
        }
    }
}
