//! Command descriptors handed to a host's registration API.
//!
//! Each descriptor carries its own option and positional schema plus a plain
//! function pointer, so a host can build its argument parser and dispatch
//! without any shared global table.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::host::{HostError, Repository};
use crate::listing::{list_one_level, write_listing};
use crate::size::{file_size, write_size};

/// Errors surfaced at the command boundary.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{command}: missing value for '{argument}'")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

/// Entry point of a command.
pub type Handler =
    fn(&dyn Repository, &Invocation, &mut dyn Write) -> Result<(), CommandError>;

/// A named option such as `-r/--rev`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionSpec {
    pub short: char,
    pub long: &'static str,
    pub value_name: &'static str,
    pub default: &'static str,
    pub help: &'static str,
}

/// A positional argument, optional when `default` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionalSpec {
    pub name: &'static str,
    pub default: Option<&'static str>,
    pub help: &'static str,
}

/// Everything a host needs to expose one command.
#[derive(Clone, Copy)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub synopsis: &'static str,
    pub about: &'static str,
    pub options: &'static [OptionSpec],
    pub positionals: &'static [PositionalSpec],
    pub handler: Handler,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("synopsis", &self.synopsis)
            .field("options", &self.options)
            .field("positionals", &self.positionals)
            .finish_non_exhaustive()
    }
}

/// Host-side registration API.
pub trait CommandRegistry {
    fn register(&mut self, descriptor: CommandDescriptor);
}

/// Registration target that simply remembers descriptors in order.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<CommandDescriptor>,
}

impl CommandTable {
    /// Returns a table holding every inspection command.
    pub fn with_inspection_commands() -> Self {
        let mut table = Self::default();
        register_commands(&mut table);

        table
    }

    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn find(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Runs the command called `name` against `repository`.
    ///
    /// # Errors
    /// Returns [`CommandError::UnknownCommand`] for unregistered names, and
    /// whatever the handler fails with otherwise.
    pub fn dispatch(
        &self,
        name: &str,
        repository: &dyn Repository,
        invocation: &Invocation,
        out: &mut dyn Write,
    ) -> Result<(), CommandError> {
        let command = self
            .find(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        (command.handler)(repository, invocation, out)
    }
}

impl CommandRegistry for CommandTable {
    fn register(&mut self, descriptor: CommandDescriptor) {
        self.commands.push(descriptor);
    }
}

/// Parsed argument values of one invocation, keyed by schema name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    command: &'static str,
    values: BTreeMap<&'static str, String>,
}

impl Invocation {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            values: BTreeMap::new(),
        }
    }

    /// Builds an invocation holding every schema default of `descriptor`.
    pub fn with_defaults(descriptor: &CommandDescriptor) -> Self {
        let mut invocation = Self::new(descriptor.name);
        for option in descriptor.options {
            invocation.set(option.long, option.default);
        }
        for positional in descriptor.positionals {
            if let Some(default) = positional.default {
                invocation.set(positional.name, default);
            }
        }

        invocation
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        self.values.insert(name, value.into());
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    /// Returns [`CommandError::MissingArgument`] when nothing is bound.
    pub fn get(&self, name: &'static str) -> Result<&str, CommandError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or(CommandError::MissingArgument {
                command: self.command,
                argument: name,
            })
    }
}

const REV_OPTION: &str = "rev";
const PATH_ARGUMENT: &str = "path";

pub const LS_ONELEVEL: CommandDescriptor = CommandDescriptor {
    name: "ls-onelevel",
    synopsis: "ls-onelevel [-r REV] [path]",
    about: "list the files and subdirectories directly inside a directory",
    options: &[OptionSpec {
        short: 'r',
        long: REV_OPTION,
        value_name: "REV",
        default: ".",
        help: "revision to list",
    }],
    positionals: &[PositionalSpec {
        name: PATH_ARGUMENT,
        default: Some(""),
        help: "directory to list (repository root when omitted)",
    }],
    handler: ls_onelevel,
};

pub const FSIZE: CommandDescriptor = CommandDescriptor {
    name: "fsize",
    synopsis: "fsize [-r REV] [path]",
    about: "print the size in bytes of a file without checking it out",
    options: &[OptionSpec {
        short: 'r',
        long: REV_OPTION,
        value_name: "REV",
        default: ".",
        help: "revision to read the size from",
    }],
    positionals: &[PositionalSpec {
        name: PATH_ARGUMENT,
        default: Some(""),
        help: "file to measure (directories report 0)",
    }],
    handler: fsize,
};

/// Registers `ls-onelevel` and `fsize` with `registry`.
pub fn register_commands(registry: &mut dyn CommandRegistry) {
    registry.register(LS_ONELEVEL);
    registry.register(FSIZE);
}

fn ls_onelevel(
    repository: &dyn Repository,
    invocation: &Invocation,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let listing = list_one_level(
        repository,
        invocation.get(REV_OPTION)?,
        invocation.get(PATH_ARGUMENT)?,
    )?;
    write_listing(out, &listing)?;

    Ok(())
}

fn fsize(
    repository: &dyn Repository,
    invocation: &Invocation,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let report = file_size(
        repository,
        invocation.get(REV_OPTION)?,
        invocation.get(PATH_ARGUMENT)?,
    )?;
    write_size(out, report)?;

    Ok(())
}
