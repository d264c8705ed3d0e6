//! Read-only inspection commands for source browsers.
//!
//! `ls-onelevel` lists the immediate children of one directory at a revision
//! and `fsize` reports the stored size of one file, both without touching the
//! working copy. The commands only talk to the repository through
//! [`host::Repository`].

pub mod cli;
pub mod command;
pub mod config;
/// Git-backed implementation of the host contract.
pub mod git;
pub mod host;
pub mod listing;
pub mod path;
pub mod size;

pub use command::{CommandError, CommandTable};
pub use host::{HostError, Repository};
